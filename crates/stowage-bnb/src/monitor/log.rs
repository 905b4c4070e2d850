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

//! Periodic progress reporting through the `log` facade.
//!
//! Every `log_interval_nodes` explored nodes one `info` line is emitted with
//! the elapsed time, node count, depth, incumbent, current objective,
//! backtracks and prunings. Improving solutions are logged as they appear.

use crate::{
    branching::decision::Decision,
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    state::SearchState,
    stats::BnbSolverStatistics,
};
use num_traits::{PrimInt, Signed};
use std::time::Instant;
use stowage_model::{model::Model, objective::Objective, solution::Solution};

#[derive(Debug, Clone)]
pub struct LogTreeSearchMonitor<T> {
    start_time: Instant,
    log_interval_nodes: u64,
    best_objective: Option<Objective<T>>,
}

impl<T> LogTreeSearchMonitor<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    /// # Panics
    ///
    /// Panics if `log_interval_nodes` is zero.
    pub fn new(log_interval_nodes: u64) -> Self {
        assert!(
            log_interval_nodes > 0,
            "called `LogTreeSearchMonitor::new` with a zero log interval"
        );
        Self {
            start_time: Instant::now(),
            log_interval_nodes,
            best_objective: None,
        }
    }

    #[inline]
    pub fn log_interval_nodes(&self) -> u64 {
        self.log_interval_nodes
    }

    fn log_line(&self, state: &SearchState<T>, stats: &BnbSolverStatistics) {
        let best = match &self.best_objective {
            Some(o) => o.to_string(),
            None => "none".to_string(),
        };
        log::info!(
            "{:>8.1}s | nodes {:>12} | depth {:>4} | best {} | current {} | backtracks {} | pruned {}/{}",
            self.start_time.elapsed().as_secs_f32(),
            stats.nodes_explored,
            state.num_assigned_objects(),
            best,
            state.current_objective(),
            stats.backtracks,
            stats.prunings_bound,
            stats.prunings_infeasible
        );
    }
}

impl<T> Default for LogTreeSearchMonitor<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn default() -> Self {
        Self::new(100_000)
    }
}

impl<T> std::fmt::Display for LogTreeSearchMonitor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogTreeSearchMonitor(log_interval_nodes: {})",
            self.log_interval_nodes
        )
    }
}

impl<T> TreeSearchMonitor<T> for LogTreeSearchMonitor<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn name(&self) -> &str {
        "LogTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, model: &Model<T>, _statistics: &BnbSolverStatistics) {
        self.start_time = Instant::now();
        self.best_objective = None;
        log::info!(
            "search started: {} objects, container {}",
            model.num_objects(),
            model.container_extents()
        );
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        log::info!(
            "search finished after {} nodes in {:.2?}",
            statistics.nodes_explored,
            statistics.time_total
        );
        log::debug!("{}", statistics);
    }

    fn on_step(&mut self, _state: &SearchState<T>, _statistics: &BnbSolverStatistics) {}

    fn on_lower_bound_computed(
        &mut self,
        state: &SearchState<T>,
        lower_bound: Objective<T>,
        statistics: &BnbSolverStatistics,
    ) {
        if statistics.nodes_explored == 1 {
            log::debug!(
                "root bound {} with {} objects placed",
                lower_bound,
                state.num_assigned_objects()
            );
        }
    }

    fn on_prune(
        &mut self,
        _state: &SearchState<T>,
        _reason: PruneReason,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    fn on_decisions_enqueued(
        &mut self,
        _state: &SearchState<T>,
        _count: usize,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    fn on_descend(
        &mut self,
        state: &SearchState<T>,
        _decision: Decision<T>,
        statistics: &BnbSolverStatistics,
    ) {
        if statistics.nodes_explored % self.log_interval_nodes == 0 {
            self.log_line(state, statistics);
        }
    }

    fn on_backtrack(&mut self, _state: &SearchState<T>, _statistics: &BnbSolverStatistics) {}

    fn on_solution_found(&mut self, solution: &Solution<T>, statistics: &BnbSolverStatistics) {
        let objective = solution.objective();
        self.best_objective = Some(objective);
        log::info!(
            "new incumbent {} after {} nodes",
            objective,
            statistics.nodes_explored
        );
    }
}
