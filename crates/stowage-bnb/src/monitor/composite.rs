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

//! Fan-out for tree search monitors
//!
//! `CompositeTreeSearchMonitor` forwards every event to its children in
//! insertion order. `search_command` returns the first non-`Continue`
//! answer, so stricter stop conditions belong first.

use crate::{
    branching::decision::Decision,
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    state::SearchState,
    stats::BnbSolverStatistics,
};
use num_traits::{PrimInt, Signed};
use stowage_model::{model::Model, objective::Objective, solution::Solution};
use stowage_search::monitor::search_monitor::SearchCommand;

pub struct CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    monitors: Vec<Box<dyn TreeSearchMonitor<T> + 'a>>,
}

impl<'a, T> Default for CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> std::fmt::Debug for CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.monitors.iter().map(|m| m.name()).collect();
        f.debug_struct("CompositeTreeSearchMonitor")
            .field("monitors", &names)
            .finish()
    }
}

impl<'a, T> CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: TreeSearchMonitor<T> + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    #[inline(always)]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn TreeSearchMonitor<T> + 'a>) {
        self.monitors.push(monitor);
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<'a, T> FromIterator<Box<dyn TreeSearchMonitor<T> + 'a>> for CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn TreeSearchMonitor<T> + 'a>>,
    {
        Self {
            monitors: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> TreeSearchMonitor<T> for CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    fn name(&self) -> &str {
        "CompositeTreeSearchMonitor"
    }

    #[inline(always)]
    fn on_enter_search(&mut self, model: &Model<T>, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(model, statistics);
        }
    }

    #[inline(always)]
    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search(statistics);
        }
    }

    #[inline(always)]
    fn search_command(
        &mut self,
        state: &SearchState<T>,
        statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        for monitor in &mut self.monitors {
            let cmd = monitor.search_command(state, statistics);
            if !matches!(cmd, SearchCommand::Continue) {
                return cmd;
            }
        }
        SearchCommand::Continue
    }

    #[inline(always)]
    fn on_step(&mut self, state: &SearchState<T>, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_step(state, statistics);
        }
    }

    #[inline(always)]
    fn on_lower_bound_computed(
        &mut self,
        state: &SearchState<T>,
        lower_bound: Objective<T>,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_lower_bound_computed(state, lower_bound, statistics);
        }
    }

    #[inline(always)]
    fn on_prune(
        &mut self,
        state: &SearchState<T>,
        reason: PruneReason,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_prune(state, reason, statistics);
        }
    }

    #[inline(always)]
    fn on_decisions_enqueued(
        &mut self,
        state: &SearchState<T>,
        count: usize,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_decisions_enqueued(state, count, statistics);
        }
    }

    #[inline(always)]
    fn on_descend(
        &mut self,
        state: &SearchState<T>,
        decision: Decision<T>,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_descend(state, decision, statistics);
        }
    }

    #[inline(always)]
    fn on_solution_found(&mut self, solution: &Solution<T>, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_solution_found(solution, statistics);
        }
    }

    #[inline(always)]
    fn on_backtrack(&mut self, state: &SearchState<T>, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_backtrack(state, statistics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::no_op::NoOperationMonitor;
    use std::{cell::Cell, rc::Rc};

    type IntegerType = i64;

    struct Counting {
        steps: Rc<Cell<usize>>,
        stop_after: Option<usize>,
    }

    impl TreeSearchMonitor<IntegerType> for Counting {
        fn name(&self) -> &str {
            "Counting"
        }
        fn on_enter_search(&mut self, _: &Model<IntegerType>, _: &BnbSolverStatistics) {}
        fn on_exit_search(&mut self, _: &BnbSolverStatistics) {}
        fn search_command(
            &mut self,
            _: &SearchState<IntegerType>,
            _: &BnbSolverStatistics,
        ) -> SearchCommand {
            match self.stop_after {
                Some(limit) if self.steps.get() >= limit => {
                    SearchCommand::Terminate(format!("stopped after {}", limit))
                }
                _ => SearchCommand::Continue,
            }
        }
        fn on_step(&mut self, _: &SearchState<IntegerType>, _: &BnbSolverStatistics) {
            self.steps.set(self.steps.get() + 1);
        }
        fn on_lower_bound_computed(
            &mut self,
            _: &SearchState<IntegerType>,
            _: Objective<IntegerType>,
            _: &BnbSolverStatistics,
        ) {
        }
        fn on_prune(&mut self, _: &SearchState<IntegerType>, _: PruneReason, _: &BnbSolverStatistics) {}
        fn on_decisions_enqueued(
            &mut self,
            _: &SearchState<IntegerType>,
            _: usize,
            _: &BnbSolverStatistics,
        ) {
        }
        fn on_descend(
            &mut self,
            _: &SearchState<IntegerType>,
            _: Decision<IntegerType>,
            _: &BnbSolverStatistics,
        ) {
        }
        fn on_backtrack(&mut self, _: &SearchState<IntegerType>, _: &BnbSolverStatistics) {}
        fn on_solution_found(&mut self, _: &Solution<IntegerType>, _: &BnbSolverStatistics) {}
    }

    #[test]
    fn test_fans_out_events() {
        let a = Rc::new(Cell::new(0));
        let b = Rc::new(Cell::new(0));
        let mut composite = CompositeTreeSearchMonitor::new();
        composite.add_monitor(Counting { steps: a.clone(), stop_after: None });
        composite.add_monitor(NoOperationMonitor::new());
        composite.add_monitor(Counting { steps: b.clone(), stop_after: None });
        assert_eq!(composite.len(), 3);

        let state = SearchState::new(0);
        let stats = BnbSolverStatistics::default();
        composite.on_step(&state, &stats);
        composite.on_step(&state, &stats);
        assert_eq!((a.get(), b.get()), (2, 2));
        assert_eq!(composite.search_command(&state, &stats), SearchCommand::Continue);
    }

    #[test]
    fn test_first_terminate_wins() {
        let a = Rc::new(Cell::new(1));
        let b = Rc::new(Cell::new(5));
        let mut composite = CompositeTreeSearchMonitor::new();
        composite.add_monitor(Counting { steps: a, stop_after: Some(1) });
        composite.add_monitor(Counting { steps: b, stop_after: Some(2) });

        let state = SearchState::new(0);
        let stats = BnbSolverStatistics::default();
        assert_eq!(
            composite.search_command(&state, &stats),
            SearchCommand::Terminate("stopped after 1".to_string())
        );
    }

    #[test]
    fn test_empty_composite_continues() {
        let mut composite = CompositeTreeSearchMonitor::<IntegerType>::default();
        assert!(composite.is_empty());
        let state = SearchState::new(0);
        let stats = BnbSolverStatistics::default();
        assert_eq!(composite.search_command(&state, &stats), SearchCommand::Continue);
    }
}
