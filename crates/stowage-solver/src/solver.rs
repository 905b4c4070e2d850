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

//! # Parallel Orchestrated Solver
//!
//! Runs several search workers side by side on one model, lets them share
//! the best packing found so far and enforces global termination criteria
//! via pluggable monitors (time limit, solution count, stop flag).
//!
//! ## Partitioning
//!
//! With `n` workers, worker `w` explores the root decisions whose position is
//! congruent to `w` modulo `n`. Each worker keeps its own partial packing and
//! publishes improving packings to the shared incumbent, which every worker
//! prunes against. The whole tree is proven once every partition is
//! proven. A partition that ran out of decisions without a proof, because
//! its branching left out placements, counts as finished: it stops nobody,
//! and the run then ends `Exhausted` with the best packing found.
//!
//! ## Highlights
//!
//! - Worker execution:
//!   - Every `PortfolioSolver<T>` runs on a named thread in `std::thread::scope`.
//!   - Each thread owns a `CompositeMonitor<T>` with a solution-limit monitor
//!     and an optional time-limit monitor; the shared stop flag reaches the
//!     worker through its context.
//! - Shared state:
//!   - `SharedIncumbent<T>` stores the best packing (atomic hints + mutex snapshot).
//!   - A global `AtomicU64` counts solutions; an `AtomicBool` is the stop signal.
//! - Outcome construction:
//!   - Aggregates worker results and the incumbent into one `SolverOutcome<T>`.
//!
//! ## Usage
//!
//! ```rust
//! use stowage_bnb::{
//!     branching::input_order::InputOrderBuilder, eval::lexicographic::LexicographicEvaluator,
//!     portfolio::BnbPortfolioSolver,
//! };
//! use stowage_model::{model::ModelBuilder, orientation::Extents};
//! use stowage_solver::solver::SolverBuilder;
//!
//! let mut builder = ModelBuilder::<i64>::new(Extents::new(4, 4, 2));
//! builder.add_object(Extents::new(4, 4, 1));
//! builder.add_object(Extents::new(4, 4, 1));
//! let model = builder.build();
//!
//! let mut solver = SolverBuilder::<i64>::new()
//!     .with_time_limit(std::time::Duration::from_secs(10))
//!     .add_solver(BnbPortfolioSolver::new(
//!         InputOrderBuilder::new(),
//!         LexicographicEvaluator::new(),
//!     ))
//!     .build();
//!
//! let outcome = solver.solve(&model);
//! assert!(outcome.is_optimal());
//! ```

use std::{
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
    time::{Duration, Instant},
};
use stowage_model::{model::Model, solution::Solution};
use stowage_search::{
    incumbent::SharedIncumbent,
    monitor::{
        composite::CompositeMonitor, interrupt::INTERRUPT_REASON, solution::SolutionMonitor,
        time_limit::TimeLimitMonitor,
    },
    num::SolverNumeric,
    portfolio::{PortfolioSolver, PortfolioSolverContext, PortfolioSolverResult, SearchPartition},
    result::{SolverOutcome, TerminationReason},
    stats::{SolverStatistics, SolverStatisticsBuilder},
};

pub struct Solver<'a, T> {
    workers: Vec<Box<dyn PortfolioSolver<T> + Send + 'a>>,
    incumbent: SharedIncumbent<T>,
    global_solution_count: AtomicU64,
    /// Raised to stop all workers, e.g. once the whole tree is proven or one
    /// worker hit a limit.
    stop_signal: AtomicBool,
    solution_limit: Option<u64>,
    time_limit: Option<Duration>,
}

impl<'a, T> std::fmt::Debug for Solver<'a, T>
where
    T: SolverNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field(
                "workers",
                &self.workers.iter().map(|w| w.name()).collect::<Vec<_>>(),
            )
            .field("incumbent", &self.incumbent)
            .field("solution_limit", &self.solution_limit)
            .field("time_limit", &self.time_limit)
            .finish()
    }
}

impl<'a, T> Solver<'a, T>
where
    T: SolverNumeric,
{
    #[inline]
    pub fn add_solver<S>(&mut self, solver: S)
    where
        S: PortfolioSolver<T> + Send + 'a,
    {
        self.workers.push(Box::new(solver));
    }

    #[inline]
    pub fn add_solver_boxed(&mut self, solver: Box<dyn PortfolioSolver<T> + Send + 'a>) {
        self.workers.push(solver);
    }

    #[inline]
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    #[inline]
    pub fn incumbent(&self) -> &SharedIncumbent<T> {
        &self.incumbent
    }

    /// Offers `solution` as a starting incumbent. Returns `true` if it was
    /// better than the current one.
    ///
    /// The caller is responsible for `solution` being valid for the model
    /// that is solved next.
    pub fn seed(&self, solution: &Solution<T>) -> bool {
        let installed = self.incumbent.try_install(solution);
        if installed {
            log::info!("seeded incumbent with objective {}", solution.objective());
        } else {
            log::debug!(
                "seed with objective {} does not improve the incumbent",
                solution.objective()
            );
        }
        installed
    }

    #[inline]
    pub fn solution_limit(&self) -> Option<u64> {
        self.solution_limit
    }

    #[inline]
    pub fn has_solution_limit(&self) -> bool {
        self.solution_limit.is_some()
    }

    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    #[inline]
    pub fn has_time_limit(&self) -> bool {
        self.time_limit.is_some()
    }

    /// Solves `model` with all workers.
    ///
    /// The incumbent is kept across calls, so a solver must only be reused
    /// for the same model.
    ///
    /// # Panics
    ///
    /// Panics if no worker was added, or if a worker panics.
    pub fn solve(&mut self, model: &Model<T>) -> SolverOutcome<T> {
        assert!(
            !self.workers.is_empty(),
            "called `Solver::solve` with no portfolio solvers added"
        );

        let start_time = Instant::now();

        self.stop_signal.store(false, Ordering::Relaxed);
        self.global_solution_count.store(0, Ordering::Relaxed);

        log::info!(
            "solving {} objects with {} worker(s), time limit {}",
            model.num_objects(),
            self.workers.len(),
            match self.time_limit {
                Some(limit) => format!("{:.1?}", limit),
                None => "none".to_string(),
            }
        );

        let results = self.run_workers_parallel(model);
        let outcome = self.construct_outcome(start_time, results);

        log::info!(
            "finished: {} ({}) after {:.3}s",
            outcome.result(),
            outcome.reason(),
            outcome.statistics().solve_duration.as_secs_f64()
        );
        outcome
    }

    fn run_workers_parallel(&mut self, model: &Model<T>) -> Vec<PortfolioSolverResult<T>> {
        let solution_limit = self.solution_limit;
        let time_limit = self.time_limit;
        let incumbent = &self.incumbent;
        let global_solution_count = &self.global_solution_count;
        let stop_signal = &self.stop_signal;
        let num_workers = self.workers.len();

        let mut results = Vec::with_capacity(num_workers);

        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(num_workers);

            for (index, worker) in self.workers.iter_mut().enumerate() {
                let partition = SearchPartition::new(index, num_workers);
                let spawned = std::thread::Builder::new()
                    .name(format!("worker-{}", index))
                    .spawn_scoped(scope, move || {
                        let mut monitor = CompositeMonitor::<T>::with_capacity(2);
                        monitor.add_monitor(SolutionMonitor::new(
                            global_solution_count,
                            solution_limit,
                        ));
                        if let Some(limit) = time_limit {
                            monitor.add_monitor(TimeLimitMonitor::new(limit));
                        }

                        let context = PortfolioSolverContext::new(
                            model,
                            incumbent,
                            &mut monitor,
                            stop_signal,
                            partition,
                        );
                        let result = worker.solve(context);
                        log::debug!(
                            "{} on partition {} returned {} after {} nodes",
                            worker.name(),
                            partition,
                            result,
                            result.nodes_explored()
                        );

                        if !result.is_finished() {
                            // One worker hit a limit; the others follow.
                            stop_signal.store(true, Ordering::Relaxed);
                        } else if partition.is_complete() && result.is_proof() {
                            log::info!(
                                "{} proved the whole tree, signaling stop to other workers",
                                worker.name()
                            );
                            stop_signal.store(true, Ordering::Relaxed);
                        }

                        result
                    });

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        log::error!("failed to spawn worker {}: {}", index, err);
                        stop_signal.store(true, Ordering::Relaxed);
                        results.push(PortfolioSolverResult::aborted(
                            None,
                            format!("failed to spawn worker: {}", err),
                        ));
                    }
                }
            }

            for handle in handles {
                match handle.join() {
                    Ok(result) => results.push(result),
                    Err(payload) => std::panic::resume_unwind(payload),
                }
            }
        });

        results
    }

    /// The best packing among the worker results and the shared incumbent.
    fn find_best_solution(&self, results: &[PortfolioSolverResult<T>]) -> Option<Solution<T>> {
        let worker_solutions = results.iter().filter_map(|r| r.result().solution());
        let incumbent_snapshot = self.incumbent.snapshot();

        worker_solutions
            .chain(incumbent_snapshot.as_ref())
            .min_by_key(|s| s.objective())
            .cloned()
    }

    fn build_statistics(
        &self,
        start_time: Instant,
        results: &[PortfolioSolverResult<T>],
    ) -> SolverStatistics {
        let nodes_explored = results
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.nodes_explored()));

        SolverStatisticsBuilder::new()
            .solutions_found(self.global_solution_count.load(Ordering::Relaxed))
            .nodes_explored(nodes_explored)
            .used_threads(results.len())
            .solve_duration(start_time.elapsed())
            .build()
    }

    fn construct_outcome(
        &self,
        start_time: Instant,
        results: Vec<PortfolioSolverResult<T>>,
    ) -> SolverOutcome<T> {
        let stats = self.build_statistics(start_time, &results);
        let best_solution = self.find_best_solution(&results);

        // Every partition proven means the whole tree is.
        let tree_proven = !results.is_empty() && results.iter().all(|r| r.is_proof());
        let tree_finished = !results.is_empty() && results.iter().all(|r| r.is_finished());

        match (best_solution, tree_proven) {
            (Some(solution), true) => SolverOutcome::optimal(solution, stats),
            (None, true) => SolverOutcome::infeasible(stats),
            (solution, false) if tree_finished => SolverOutcome::exhausted(solution, stats),
            (Some(solution), false) => {
                let reason = self.determine_abort_reason(&results);
                SolverOutcome::feasible(solution, reason, stats)
            }
            (None, false) => {
                let reason = self.determine_abort_reason(&results);
                SolverOutcome::unknown(reason, stats)
            }
        }
    }

    /// The first abort reason that is not the induced stop of another worker.
    fn determine_abort_reason(&self, results: &[PortfolioSolverResult<T>]) -> String {
        let aborted = results.iter().filter_map(|r| match r.termination_reason() {
            TerminationReason::Aborted(msg) => Some(msg.as_str()),
            _ => None,
        });

        let mut induced = None;
        for msg in aborted {
            if msg != INTERRUPT_REASON {
                return msg.to_string();
            }
            induced.get_or_insert(msg);
        }

        match induced {
            Some(msg) => msg.to_string(),
            None => "search space exhausted without proof".to_string(),
        }
    }
}

pub struct SolverBuilder<'a, T> {
    workers: Vec<Box<dyn PortfolioSolver<T> + Send + 'a>>,
    solution_limit: Option<u64>,
    time_limit: Option<Duration>,
}

impl<'a, T> Default for SolverBuilder<'a, T>
where
    T: SolverNumeric,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> SolverBuilder<'a, T>
where
    T: SolverNumeric,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            workers: Vec::new(),
            solution_limit: None,
            time_limit: None,
        }
    }

    #[inline]
    pub fn with_solution_limit(mut self, limit: u64) -> Self {
        self.solution_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    #[inline]
    pub fn add_solver<S>(mut self, solver: S) -> Self
    where
        S: PortfolioSolver<T> + Send + 'a,
    {
        self.workers.push(Box::new(solver));
        self
    }

    #[inline]
    pub fn add_solver_boxed(mut self, solver: Box<dyn PortfolioSolver<T> + Send + 'a>) -> Self {
        self.workers.push(solver);
        self
    }

    #[inline]
    pub fn build(self) -> Solver<'a, T> {
        Solver {
            workers: self.workers,
            incumbent: SharedIncumbent::new(),
            global_solution_count: AtomicU64::new(0),
            stop_signal: AtomicBool::new(false),
            solution_limit: self.solution_limit,
            time_limit: self.time_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_bnb::{
        branching::input_order::InputOrderBuilder, eval::lexicographic::LexicographicEvaluator,
        portfolio::BnbPortfolioSolver,
    };
    use stowage_model::{model::ModelBuilder, objective::Objective, orientation::Extents, validation};
    use test_case::test_case;

    type IntegerType = i64;

    fn build_model(
        container: (IntegerType, IntegerType, IntegerType),
        objects: &[(IntegerType, IntegerType, IntegerType)],
    ) -> Model<IntegerType> {
        let mut b = ModelBuilder::new(Extents::new(container.0, container.1, container.2));
        for &(l, w, h) in objects {
            b.add_object(Extents::new(l, w, h));
        }
        b.build()
    }

    fn build_solver<'a>(num_workers: usize) -> SolverBuilder<'a, IntegerType> {
        (0..num_workers).fold(
            SolverBuilder::new().with_time_limit(Duration::from_secs(60)),
            |builder, _| {
                builder.add_solver(BnbPortfolioSolver::new(
                    InputOrderBuilder::new(),
                    LexicographicEvaluator::new(),
                ))
            },
        )
    }

    fn mixed_model() -> Model<IntegerType> {
        build_model((4, 4, 2), &[(2, 2, 2), (4, 2, 1), (2, 2, 1)])
    }

    #[test_case(1; "single worker")]
    #[test_case(2; "two workers")]
    #[test_case(3; "three workers")]
    fn test_stacked_slabs_are_optimal(num_workers: usize) {
        let model = build_model((4, 4, 2), &[(4, 4, 1), (4, 4, 1)]);
        let mut solver = build_solver(num_workers).build();
        let outcome = solver.solve(&model);

        assert!(outcome.is_optimal(), "got {}", outcome);
        assert_eq!(outcome.reason(), &TerminationReason::OptimalityProven);
        let solution = outcome.solution().expect("optimal outcome has a solution");
        assert_eq!(solution.objective(), Objective::new(1, 1));
        assert_eq!(outcome.statistics().used_threads, num_workers);
    }

    #[test]
    fn test_worker_count_does_not_change_the_optimum() {
        let model = mixed_model();

        let single = build_solver(1).build().solve(&model);
        let parallel = build_solver(3).build().solve(&model);

        assert!(single.is_optimal());
        assert!(parallel.is_optimal());
        let a = single.solution().expect("solution");
        let b = parallel.solution().expect("solution");
        assert_eq!(a.objective(), b.objective());
        assert_eq!(validation::validate(&model, b), Ok(()));
    }

    #[test_case(1; "single worker")]
    #[test_case(2; "two workers")]
    fn test_unpackable_object_is_infeasible(num_workers: usize) {
        let model = build_model((10, 10, 10), &[(5, 5, 5), (11, 1, 1)]);
        let mut solver = build_solver(num_workers).build();
        let outcome = solver.solve(&model);

        assert!(outcome.is_infeasible());
        assert_eq!(outcome.reason(), &TerminationReason::InfeasibilityProven);
        assert!(!outcome.has_solution());
    }

    #[test]
    fn test_seeded_optimum_is_confirmed() {
        let model = build_model((4, 4, 4), &[(4, 4, 4), (4, 4, 4)]);
        let first = build_solver(1).build().solve(&model);
        let optimum = first.solution().expect("solution").clone();

        let mut solver = build_solver(2).build();
        assert!(solver.seed(&optimum));
        assert!(!solver.seed(&optimum));

        let outcome = solver.solve(&model);
        assert!(outcome.is_optimal());
        assert_eq!(
            outcome.solution().map(|s| s.objective()),
            Some(optimum.objective())
        );
        assert_eq!(outcome.statistics().solutions_found, 0);
    }

    #[test]
    fn test_solution_limit_stops_early_with_a_packing() {
        let model = mixed_model();
        let mut solver = build_solver(2).with_solution_limit(1).build();
        let outcome = solver.solve(&model);

        assert!(outcome.has_solution());
        if !outcome.is_optimal() {
            assert_eq!(
                outcome.reason(),
                &TerminationReason::Aborted("global solution limit reached".into())
            );
        }
        assert!(outcome.statistics().solutions_found >= 1);
    }

    #[test]
    fn test_solver_is_reusable() {
        let model = build_model((10, 10, 10), &[(5, 5, 5)]);
        let mut solver = build_solver(2).build();

        let a = solver.solve(&model);
        let b = solver.solve(&model);
        assert!(a.is_optimal() && b.is_optimal());
        assert_eq!(a.result, b.result);
    }

    #[test_case(1; "single worker")]
    #[test_case(2; "two workers")]
    fn test_restricted_branching_ends_exhausted(num_workers: usize) {
        // Too large for the full grid, so no partition can prove anything.
        let model = build_model((100, 100, 100), &[(10, 10, 10), (10, 10, 10)]);
        let mut solver = build_solver(num_workers).build();
        let outcome = solver.solve(&model);

        assert!(!outcome.is_optimal());
        assert_eq!(outcome.reason(), &TerminationReason::Exhausted);
        let solution = outcome.solution().expect("packing found");
        assert_eq!(solution.objective(), Objective::new(1, 10));
        assert_eq!(validation::validate(&model, solution), Ok(()));
    }

    #[test]
    fn test_exhausted_partitions_do_not_claim_a_proof() {
        let solver = build_solver(2).build();
        let exhausted = PortfolioSolverResult::<IntegerType>::exhausted(None);
        let proven = PortfolioSolverResult::<IntegerType>::infeasible();

        let outcome = solver.construct_outcome(Instant::now(), vec![proven, exhausted]);
        assert_eq!(outcome.reason(), &TerminationReason::Exhausted);
        assert!(!outcome.has_solution());
        assert!(!outcome.is_infeasible());
    }

    #[test]
    fn test_abort_reason_prefers_primary_cause() {
        let solver = build_solver(1).build();
        let results = vec![
            PortfolioSolverResult::<IntegerType>::aborted(None, INTERRUPT_REASON),
            PortfolioSolverResult::aborted(None, "time limit reached"),
        ];
        assert_eq!(solver.determine_abort_reason(&results), "time limit reached");

        let results = vec![PortfolioSolverResult::<IntegerType>::aborted(
            None,
            INTERRUPT_REASON,
        )];
        assert_eq!(solver.determine_abort_reason(&results), INTERRUPT_REASON);
    }

    #[test]
    #[should_panic(expected = "called `Solver::solve` with no portfolio solvers added")]
    fn test_solve_without_workers_panics() {
        let model = build_model((1, 1, 1), &[]);
        let mut solver = SolverBuilder::<IntegerType>::new().build();
        let _ = solver.solve(&model);
    }
}
