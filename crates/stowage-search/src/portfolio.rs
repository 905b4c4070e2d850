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

//! The contract between the orchestrating solver and its workers.
//!
//! Each worker receives a [`PortfolioSolverContext`] holding the model, the
//! shared incumbent, its own monitor, the global stop flag and the
//! [`SearchPartition`] of the root decisions it is responsible for.

use crate::{
    incumbent::SharedIncumbent,
    monitor::search_monitor::SearchMonitor,
    result::{SolverResult, TerminationReason},
};
use num_traits::{PrimInt, Signed};
use std::sync::atomic::AtomicBool;
use stowage_model::{model::Model, solution::Solution};

/// A slice of the root decisions: worker `index` of `count` explores the
/// root decisions whose position is congruent to `index` modulo `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchPartition {
    index: usize,
    count: usize,
}

impl SearchPartition {
    /// A slice of the root decisions.
    ///
    /// # Panics
    ///
    /// Panics if `count == 0` or `index >= count`.
    #[inline]
    pub fn new(index: usize, count: usize) -> Self {
        assert!(
            index < count,
            "called `SearchPartition::new` with index out of bounds: the count is {} but the index is {}",
            count,
            index
        );
        Self { index, count }
    }

    /// The whole tree.
    #[inline]
    pub const fn complete() -> Self {
        Self { index: 0, count: 1 }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.count == 1
    }

    /// Returns `true` if the root decision at `position` belongs to this slice.
    #[inline]
    pub fn covers(&self, position: usize) -> bool {
        position % self.count == self.index
    }
}

impl Default for SearchPartition {
    fn default() -> Self {
        Self::complete()
    }
}

impl std::fmt::Display for SearchPartition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.index + 1, self.count)
    }
}

pub struct PortfolioSolverContext<'a, T>
where
    T: PrimInt + Signed,
{
    pub model: &'a Model<T>,
    pub incumbent: &'a SharedIncumbent<T>,
    pub monitor: &'a mut dyn SearchMonitor<T>,
    pub stop: &'a AtomicBool,
    pub partition: SearchPartition,
}

impl<'a, T> PortfolioSolverContext<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    pub fn new(
        model: &'a Model<T>,
        incumbent: &'a SharedIncumbent<T>,
        monitor: &'a mut dyn SearchMonitor<T>,
        stop: &'a AtomicBool,
        partition: SearchPartition,
    ) -> Self {
        Self {
            model,
            incumbent,
            monitor,
            stop,
            partition,
        }
    }
}

impl<'a, T> std::fmt::Debug for PortfolioSolverContext<'a, T>
where
    T: PrimInt + Signed + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioSolverContext")
            .field("model", &self.model)
            .field("incumbent", &self.incumbent)
            .field("monitor", &self.monitor.name())
            .field("stop", &self.stop)
            .field("partition", &self.partition)
            .finish()
    }
}

/// What one worker reports back.
///
/// A proof (`OptimalityProven` or `InfeasibilityProven`) only covers the
/// worker's [`SearchPartition`], relative to the shared incumbent: an
/// exhausted slice holds nothing better than what the incumbent held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioSolverResult<T> {
    result: SolverResult<T>,
    termination_reason: TerminationReason,
    nodes_explored: u64,
}

impl<T> PortfolioSolverResult<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn optimal(solution: Solution<T>) -> Self {
        Self {
            result: SolverResult::Optimal(solution),
            termination_reason: TerminationReason::OptimalityProven,
            nodes_explored: 0,
        }
    }

    #[inline]
    pub fn infeasible() -> Self {
        Self {
            result: SolverResult::Infeasible,
            termination_reason: TerminationReason::InfeasibilityProven,
            nodes_explored: 0,
        }
    }

    /// The search stopped early, holding `solution` if it found one.
    #[inline]
    pub fn aborted<R>(solution: Option<Solution<T>>, reason: R) -> Self
    where
        R: Into<String>,
    {
        let result = match solution {
            Some(sol) => SolverResult::Feasible(sol),
            None => SolverResult::Unknown,
        };

        Self {
            result,
            termination_reason: TerminationReason::Aborted(reason.into()),
            nodes_explored: 0,
        }
    }

    /// The worker ran out of candidates in a restricted tree.
    #[inline]
    pub fn exhausted(solution: Option<Solution<T>>) -> Self {
        let result = match solution {
            Some(sol) => SolverResult::Feasible(sol),
            None => SolverResult::Unknown,
        };

        Self {
            result,
            termination_reason: TerminationReason::Exhausted,
            nodes_explored: 0,
        }
    }

    #[inline]
    pub fn with_nodes_explored(mut self, nodes_explored: u64) -> Self {
        self.nodes_explored = nodes_explored;
        self
    }

    #[inline]
    pub fn result(&self) -> &SolverResult<T> {
        &self.result
    }

    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    #[inline]
    pub fn nodes_explored(&self) -> u64 {
        self.nodes_explored
    }

    /// Returns `true` if the worker exhausted its partition.
    #[inline]
    pub fn is_proof(&self) -> bool {
        matches!(
            self.termination_reason,
            TerminationReason::OptimalityProven | TerminationReason::InfeasibilityProven
        )
    }

    /// Returns `true` if the worker ran out of work rather than being
    /// stopped, with or without a proof.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.is_proof() || self.termination_reason == TerminationReason::Exhausted
    }
}

impl<T> std::fmt::Display for PortfolioSolverResult<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PortfolioSolverResult(result: {}, termination_reason: {})",
            self.result, self.termination_reason
        )
    }
}

/// A search strategy that can run as one worker of a portfolio.
pub trait PortfolioSolver<T>
where
    T: PrimInt + Signed,
{
    fn solve<'a>(&mut self, context: PortfolioSolverContext<'a, T>) -> PortfolioSolverResult<T>;
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    type IntegerType = i64;

    #[test]
    fn test_partition_covers_residue_class() {
        let p = SearchPartition::new(1, 3);
        let covered: Vec<usize> = (0..9).filter(|&i| p.covers(i)).collect();
        assert_eq!(covered, vec![1, 4, 7]);
        assert!(!p.is_complete());
        assert_eq!(p.to_string(), "2/3");
    }

    #[test]
    fn test_complete_partition_covers_everything() {
        let p = SearchPartition::default();
        assert!(p.is_complete());
        assert!((0..20).all(|i| p.covers(i)));
    }

    #[test]
    #[should_panic(expected = "called `SearchPartition::new` with index out of bounds")]
    fn test_partition_rejects_out_of_range_index() {
        let _ = SearchPartition::new(3, 3);
    }

    #[test]
    fn test_aborted_without_solution_is_unknown() {
        let r = PortfolioSolverResult::<IntegerType>::aborted(None, "time limit reached");
        assert_eq!(r.result(), &SolverResult::Unknown);
        assert!(!r.is_proof());
        assert_eq!(
            r.termination_reason(),
            &TerminationReason::Aborted("time limit reached".into())
        );
    }

    #[test]
    fn test_exhausted_is_finished_but_no_proof() {
        let r = PortfolioSolverResult::<IntegerType>::exhausted(Some(Solution::new(Vec::new())));
        assert!(r.is_finished());
        assert!(!r.is_proof());
        assert!(matches!(r.result(), SolverResult::Feasible(_)));

        let r = PortfolioSolverResult::<IntegerType>::aborted(None, "time limit reached");
        assert!(!r.is_finished());
    }

    #[test]
    fn test_proofs_and_node_counts() {
        let r = PortfolioSolverResult::<IntegerType>::infeasible().with_nodes_explored(42);
        assert!(r.is_proof());
        assert_eq!(r.nodes_explored(), 42);

        let r = PortfolioSolverResult::optimal(Solution::<IntegerType>::new(Vec::new()));
        assert!(r.is_proof());
        assert_eq!(
            r.to_string(),
            "PortfolioSolverResult(result: Optimal(objective=(containers: 0, coordinate sum: 0)), termination_reason: Optimality Proven)"
        );
    }
}
