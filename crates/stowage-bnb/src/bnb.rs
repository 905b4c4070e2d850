// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Branch-and-bound engine for container loading.
//!
//! `BnbSolver` explores placements depth first: every node places one more
//! object, the decisions of all open nodes live on one explicit stack, and
//! all changes to the search state go through a trail so backtracking is a
//! replay in reverse. The solver owns the trail and the stack so repeated
//! solves reuse their allocations; `reset` clears them between runs.
//!
//! Which decisions exist and in what order is up to the `DecisionBuilder`,
//! how they are scored and bounded is up to the `ObjectiveEvaluator`. A node
//! is cut when its bound cannot beat the incumbent, which may be local or
//! shared with other workers through an `IncumbentStore`. Given a
//! deterministic builder and evaluator the search is deterministic.
//!
//! Running out of decisions proves the best packing optimal, or proves that
//! none exists, only if every expansion was exhaustive. Otherwise the run
//! ends as `Exhausted` and keeps whatever it found.
//!
//! A run can be restricted to a `SearchPartition` of the root decisions.

use crate::{
    branching::decision::{Decision, DecisionBuilder},
    constraints::PlacementConstraints,
    eval::evaluator::ObjectiveEvaluator,
    incumbent::{IncumbentStore, NoSharedIncumbent, SharedIncumbentAdapter},
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    result::BnbSolverOutcome,
    stack::SearchStack,
    state::SearchState,
    stats::BnbSolverStatistics,
    trail::SearchTrail,
};
use num_traits::{PrimInt, Signed};
use smallvec::SmallVec;
use stowage_model::{
    index::ObjectIndex, model::Model, objective::Objective, solution::Solution, validation,
};
use stowage_search::{
    incumbent::SharedIncumbent, monitor::search_monitor::SearchCommand, num::SolverNumeric,
    portfolio::SearchPartition,
};

/// The execution engine of the branch-and-bound search. Tree construction is
/// delegated to a `DecisionBuilder`, scoring and bounds to an
/// `ObjectiveEvaluator`.
#[derive(Clone, Debug)]
pub struct BnbSolver<T>
where
    T: PrimInt + Signed,
{
    trail: SearchTrail<T>,
    stack: SearchStack<T>,
}

impl<T> Default for BnbSolver<T>
where
    T: PrimInt + Signed,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BnbSolver<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            trail: SearchTrail::new(),
            stack: SearchStack::new(),
        }
    }

    /// Creates a solver with trail and stack sized for `num_objects`.
    ///
    /// # Note
    ///
    /// Every solve grows the buffers to the model's size anyway; this only
    /// moves the allocations to construction time.
    #[inline]
    pub fn preallocated(num_objects: usize) -> Self {
        Self {
            trail: SearchTrail::preallocated(num_objects),
            stack: SearchStack::preallocated(num_objects),
        }
    }

    /// Solves `model` on its own, without a shared incumbent.
    #[inline]
    pub fn solve<B, E, S>(
        &mut self,
        model: &Model<T>,
        builder: &mut B,
        evaluator: &mut E,
        monitor: S,
    ) -> BnbSolverOutcome<T>
    where
        B: DecisionBuilder<T, E>,
        E: ObjectiveEvaluator<T>,
        S: TreeSearchMonitor<T>,
        T: SolverNumeric,
    {
        let backing = NoSharedIncumbent::new();
        self.solve_internal(
            model,
            builder,
            evaluator,
            monitor,
            backing,
            SearchPartition::complete(),
        )
    }

    /// Solves `model` while publishing to and pruning against `incumbent`.
    #[inline]
    pub fn solve_with_incumbent<B, E, S>(
        &mut self,
        model: &Model<T>,
        builder: &mut B,
        evaluator: &mut E,
        monitor: S,
        incumbent: &SharedIncumbent<T>,
    ) -> BnbSolverOutcome<T>
    where
        B: DecisionBuilder<T, E>,
        E: ObjectiveEvaluator<T>,
        S: TreeSearchMonitor<T>,
        T: SolverNumeric,
    {
        let backing = SharedIncumbentAdapter::new(incumbent);
        self.solve_internal(
            model,
            builder,
            evaluator,
            monitor,
            backing,
            SearchPartition::complete(),
        )
    }

    /// Explores only the root decisions covered by `partition`.
    ///
    /// A proof returned from here covers the partition alone. When the
    /// partition holds nothing better than `incumbent`, the incumbent's
    /// solution is returned.
    #[inline]
    pub fn solve_partition_with_incumbent<B, E, S>(
        &mut self,
        model: &Model<T>,
        builder: &mut B,
        evaluator: &mut E,
        monitor: S,
        incumbent: &SharedIncumbent<T>,
        partition: SearchPartition,
    ) -> BnbSolverOutcome<T>
    where
        B: DecisionBuilder<T, E>,
        E: ObjectiveEvaluator<T>,
        S: TreeSearchMonitor<T>,
        T: SolverNumeric,
    {
        let backing = SharedIncumbentAdapter::new(incumbent);
        self.solve_internal(model, builder, evaluator, monitor, backing, partition)
    }

    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    fn solve_internal<B, E, S, I>(
        &mut self,
        model: &Model<T>,
        builder: &mut B,
        evaluator: &mut E,
        mut monitor: S,
        backing: I,
        partition: SearchPartition,
    ) -> BnbSolverOutcome<T>
    where
        B: DecisionBuilder<T, E>,
        E: ObjectiveEvaluator<T>,
        S: TreeSearchMonitor<T>,
        I: IncumbentStore<T>,
        T: SolverNumeric,
    {
        let constraints = match PlacementConstraints::build(model) {
            Ok(constraints) => constraints,
            Err(err) => {
                log::debug!("{}: {}", builder.name(), err);
                return BnbSolverOutcome::infeasible(BnbSolverStatistics::default());
            }
        };

        log::debug!(
            "{} with {} on {} objects, partition {}",
            builder.name(),
            evaluator.name(),
            model.num_objects(),
            partition
        );

        let session = BnbSolverSearchSession::new(
            self,
            model,
            &constraints,
            builder,
            evaluator,
            &mut monitor,
            backing,
            partition,
        );
        let res = session.run();
        self.reset();
        res
    }

    /// Clears the trail and the stack, keeping their capacity.
    #[inline]
    pub fn reset(&mut self) {
        self.trail.reset();
        self.stack.reset();
    }
}

/// How a session loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionEnd {
    Exhausted,
    Aborted(String),
}

/// The state and logic of a single search run.
struct BnbSolverSearchSession<'a, T, B, E, S, I>
where
    T: SolverNumeric,
    I: IncumbentStore<T>,
{
    solver: &'a mut BnbSolver<T>,
    model: &'a Model<T>,
    constraints: &'a PlacementConstraints<T>,
    builder: &'a mut B,
    evaluator: &'a mut E,
    monitor: &'a mut S,
    incumbent: I,
    partition: SearchPartition,
    state: SearchState<T>,
    best_objective: Option<Objective<T>>,
    best_solution: Option<Solution<T>>,
    stats: BnbSolverStatistics,
    start_time: std::time::Instant,
}

impl<'a, T, B, E, S, I> std::fmt::Display for BnbSolverSearchSession<'a, T, B, E, S, I>
where
    T: SolverNumeric,
    I: IncumbentStore<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let best = match &self.best_objective {
            Some(o) => o.to_string(),
            None => "none".to_string(),
        };
        write!(
            f,
            "SearchSession(best_objective: {}, state: {}, nodes: {})",
            best, self.state, self.stats.nodes_explored
        )
    }
}

impl<'a, T, B, E, S, I> BnbSolverSearchSession<'a, T, B, E, S, I>
where
    T: SolverNumeric,
    B: DecisionBuilder<T, E>,
    E: ObjectiveEvaluator<T>,
    S: TreeSearchMonitor<T>,
    I: IncumbentStore<T>,
{
    #[allow(clippy::too_many_arguments)]
    #[inline]
    fn new(
        solver: &'a mut BnbSolver<T>,
        model: &'a Model<T>,
        constraints: &'a PlacementConstraints<T>,
        builder: &'a mut B,
        evaluator: &'a mut E,
        monitor: &'a mut S,
        mut incumbent: I,
        partition: SearchPartition,
    ) -> Self {
        let best_objective = incumbent.initial_upper_bound();

        Self {
            solver,
            model,
            constraints,
            builder,
            evaluator,
            monitor,
            incumbent,
            partition,
            state: SearchState::new(model.num_objects()),
            best_objective,
            best_solution: None,
            stats: BnbSolverStatistics::default(),
            start_time: std::time::Instant::now(),
        }
    }

    fn run(mut self) -> BnbSolverOutcome<T> {
        self.monitor.on_enter_search(self.model, &self.stats);

        if !self.initialize() {
            self.stats.set_total_time(self.start_time.elapsed());
            self.monitor.on_exit_search(&self.stats);
            return BnbSolverOutcome::infeasible(self.stats);
        }

        let end = loop {
            self.best_objective = self.incumbent.tighten(self.best_objective);
            self.monitor.on_step(&self.state, &self.stats);

            if let SearchCommand::Terminate(msg) =
                self.monitor.search_command(&self.state, &self.stats)
            {
                break SessionEnd::Aborted(msg);
            }

            if self.solver.stack.is_current_level_empty() {
                if self.solver.stack.depth() <= 1 {
                    break SessionEnd::Exhausted;
                }
                self.backtrack_step();
            } else {
                self.process_next_decision();
            }
        };

        self.stats.set_total_time(self.start_time.elapsed());
        self.monitor.on_exit_search(&self.stats);
        log::debug!("{}", self);
        self.finalize_result(end)
    }

    /// The better of the local solution and the one held by the incumbent
    /// store.
    fn best_known_solution(&mut self) -> Option<Solution<T>> {
        let local = self.best_solution.take();
        let shared = self.incumbent.snapshot();
        match (local, shared) {
            (Some(l), Some(s)) if s.objective() < l.objective() => Some(s),
            (Some(l), _) => Some(l),
            (None, s) => s,
        }
    }

    fn finalize_result(mut self, end: SessionEnd) -> BnbSolverOutcome<T> {
        let solution = self.best_known_solution();
        let complete = self.stats.restricted_expansions == 0;
        match (end, solution) {
            (SessionEnd::Exhausted, solution) if !complete => {
                log::debug!(
                    "{} expansions were restricted, no proof",
                    self.stats.restricted_expansions
                );
                BnbSolverOutcome::exhausted(solution, self.stats)
            }
            (SessionEnd::Exhausted, Some(solution)) => {
                BnbSolverOutcome::optimal(solution, self.stats)
            }
            (SessionEnd::Exhausted, None) => BnbSolverOutcome::infeasible(self.stats),
            (SessionEnd::Aborted(msg), solution) => {
                BnbSolverOutcome::aborted(solution, msg, self.stats)
            }
        }
    }

    /// Opens the root frame and enqueues the root decisions of this
    /// session's partition. Returns `false` if the root already has no
    /// packing.
    fn initialize(&mut self) -> bool {
        let n = self.model.num_objects();
        self.solver.trail.ensure_capacity(n);
        self.solver.stack.ensure_capacity(n);

        if self.state.is_complete() {
            self.handle_complete_solution();
        }

        // Root frame. Must exist before any decision is pushed.
        self.solver.trail.push_frame();
        self.solver.stack.push_frame();
        self.stats.on_node_explored();
        self.stats.on_depth_update(1);

        let Some(root_bound) = self.evaluator.lower_bound(self.model, &self.state) else {
            return false;
        };
        self.stats.set_root_container_bound(root_bound.containers());
        self.monitor
            .on_lower_bound_computed(&self.state, root_bound, &self.stats);

        if !self.admits(root_bound) {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return true;
        }

        let partition = self.partition;
        let decisions = self
            .builder
            .next_decision(self.evaluator, self.model, self.constraints, &self.state)
            .enumerate()
            .filter(|(position, _)| partition.covers(*position))
            .map(|(_, decision)| decision);
        let added = self.solver.stack.extend_best_first(decisions);
        self.note_expansion();
        self.monitor
            .on_decisions_enqueued(&self.state, added, &self.stats);

        true
    }

    #[inline]
    fn note_expansion(&mut self) {
        if !self.builder.is_last_expansion_exhaustive() {
            self.stats.on_restricted_expansion();
        }
    }

    /// Returns `true` if `objective` is strictly better than the best known.
    #[inline(always)]
    fn admits(&self, objective: Objective<T>) -> bool {
        self.best_objective.is_none_or(|best| objective < best)
    }

    #[inline]
    fn backtrack_step(&mut self) {
        self.stats.on_backtrack();
        self.monitor.on_backtrack(&self.state, &self.stats);

        self.solver.trail.backtrack(&mut self.state);
        self.solver.stack.pop_frame();
    }

    #[inline(always)]
    fn process_next_decision(&mut self) {
        let Some(decision) = self.solver.stack.pop() else {
            return;
        };
        self.stats.on_decision_generated();

        if !self.admits(decision.objective()) {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return;
        }

        self.descend(decision);
    }

    /// Applies `decision` in a new frame and expands the resulting node.
    #[inline(always)]
    fn descend(&mut self, decision: Decision<T>) {
        let object_index = decision.object_index();
        let placement = *decision.placement();

        debug_assert!(
            object_index.get() < self.model.num_objects(),
            "called `BnbSolverSearchSession::descend` with object index out of bounds: the len is {} but the index is {}",
            self.model.num_objects(),
            object_index.get()
        );

        let discharged: SmallVec<[ObjectIndex; 4]> = self
            .constraints
            .discharged_by(&self.state, &placement)
            .collect();

        self.solver.trail.push_frame();
        self.solver.trail.apply_placement(
            &mut self.state,
            object_index,
            placement,
            self.model.object_volume(object_index),
            decision.is_pending(),
        );
        for object in discharged {
            self.solver.trail.discharge(&mut self.state, object);
        }
        self.solver.stack.push_frame();

        self.stats.on_node_explored();
        self.stats.on_depth_update(self.solver.stack.depth() as u64);
        self.monitor.on_descend(&self.state, decision, &self.stats);

        if self.state.is_complete() {
            self.handle_complete_solution();
            return;
        }

        if self.should_backtrack_after_expand() {
            self.backtrack_step();
        }
    }

    /// Records the packing in the current (complete) state if it improves on
    /// the best known one.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the packing breaks a packing rule; the
    /// constraints must have prevented that.
    fn handle_complete_solution(&mut self) {
        let objective = self.state.current_objective();
        if !self.admits(objective) {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return;
        }

        match Solution::try_from(&self.state) {
            Ok(solution) => {
                debug_assert_eq!(
                    validation::validate(self.model, &solution),
                    Ok(()),
                    "called `BnbSolverSearchSession::handle_complete_solution` with an invalid packing"
                );
                self.best_objective = Some(objective);
                self.incumbent.on_solution_found(&solution);
                self.stats.on_solution_found();
                self.monitor.on_solution_found(&solution, &self.stats);
                self.best_solution = Some(solution);
            }
            Err(_) => {
                self.stats.on_pruning_infeasible();
                self.monitor
                    .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            }
        }
    }

    /// Bounds the current node and enqueues its children. Returns `true` if
    /// the node is cut.
    fn should_backtrack_after_expand(&mut self) -> bool {
        let Some(lower_bound) = self.evaluator.lower_bound(self.model, &self.state) else {
            self.stats.on_pruning_infeasible();
            self.monitor
                .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            return true;
        };

        self.monitor
            .on_lower_bound_computed(&self.state, lower_bound, &self.stats);

        if !self.admits(lower_bound) {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return true;
        }

        let decisions = self.builder.next_decision(
            self.evaluator,
            self.model,
            self.constraints,
            &self.state,
        );
        let added = self.solver.stack.extend_best_first(decisions);
        self.note_expansion();
        if added == 0 {
            self.stats.on_pruning_infeasible();
            self.monitor
                .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
        }
        self.monitor
            .on_decisions_enqueued(&self.state, added, &self.stats);

        false
    }
}
