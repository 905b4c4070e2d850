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

//! Tree search monitoring interface
//!
//! Declares the `TreeSearchMonitor` trait and `PruneReason`. Callbacks follow
//! the engine's lifecycle:
//! enter → step → {lower bound/prune | decisions/descend/backtrack} → solution → exit.
//! `BnbSolverStatistics` is handed to every callback.

use crate::{branching::decision::Decision, state::SearchState, stats::BnbSolverStatistics};
use num_traits::{PrimInt, Signed};
use stowage_model::{model::Model, objective::Objective, solution::Solution};
use stowage_search::monitor::search_monitor::SearchCommand;

/// Reasons for pruning a search state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PruneReason {
    /// The subtree cannot hold a valid packing.
    Infeasible,
    /// The subtree cannot beat the incumbent.
    BoundDominated,
}

impl std::fmt::Display for PruneReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PruneReason::Infeasible => write!(f, "Infeasible"),
            PruneReason::BoundDominated => write!(f, "BoundDominated"),
        }
    }
}

/// Observes and controls one run of the engine.
///
/// Every hook defaults to doing nothing and `search_command` to `Continue`.
pub trait TreeSearchMonitor<T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str;
    fn on_enter_search(&mut self, _model: &Model<T>, _statistics: &BnbSolverStatistics) {}
    fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {}
    /// Asked once per step; anything but `Continue` stops the search.
    fn search_command(
        &mut self,
        _state: &SearchState<T>,
        _statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        SearchCommand::Continue
    }
    fn on_step(&mut self, _state: &SearchState<T>, _statistics: &BnbSolverStatistics) {}
    /// Called with the bound of a freshly entered node.
    fn on_lower_bound_computed(
        &mut self,
        _state: &SearchState<T>,
        _lower_bound: Objective<T>,
        _statistics: &BnbSolverStatistics,
    ) {
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
    /// Called after `decision` has been applied to `state`.
    fn on_descend(
        &mut self,
        _state: &SearchState<T>,
        _decision: Decision<T>,
        _statistics: &BnbSolverStatistics,
    ) {
    }
    fn on_backtrack(&mut self, _state: &SearchState<T>, _statistics: &BnbSolverStatistics) {}
    fn on_solution_found(&mut self, _solution: &Solution<T>, _statistics: &BnbSolverStatistics) {}
}

impl<T> std::fmt::Debug for dyn TreeSearchMonitor<T>
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}

impl<T> std::fmt::Display for dyn TreeSearchMonitor<T>
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}
