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

use crate::stats::BnbSolverStatistics;
use num_traits::{PrimInt, Signed};
use stowage_model::solution::Solution;
use stowage_search::{
    portfolio::PortfolioSolverResult,
    result::{SolverResult, TerminationReason},
};

/// Result of the engine after termination.
#[derive(Debug, Clone)]
pub struct BnbSolverOutcome<T> {
    result: SolverResult<T>,
    termination_reason: TerminationReason,
    statistics: BnbSolverStatistics,
}

impl<T> BnbSolverOutcome<T> {
    #[inline]
    pub fn optimal(solution: Solution<T>, statistics: BnbSolverStatistics) -> Self {
        Self {
            result: SolverResult::Optimal(solution),
            termination_reason: TerminationReason::OptimalityProven,
            statistics,
        }
    }

    #[inline]
    pub fn infeasible(statistics: BnbSolverStatistics) -> Self {
        Self {
            result: SolverResult::Infeasible,
            termination_reason: TerminationReason::InfeasibilityProven,
            statistics,
        }
    }

    /// The search stopped before a proof. Without a solution the status is
    /// `Unknown`, never `Infeasible`.
    #[inline]
    pub fn aborted<R>(
        solution: Option<Solution<T>>,
        reason: R,
        statistics: BnbSolverStatistics,
    ) -> Self
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
            statistics,
        }
    }

    /// The tree ran out of decisions, but some expansion left out
    /// placements, so running out proves nothing.
    #[inline]
    pub fn exhausted(solution: Option<Solution<T>>, statistics: BnbSolverStatistics) -> Self {
        let result = match solution {
            Some(sol) => SolverResult::Feasible(sol),
            None => SolverResult::Unknown,
        };

        Self {
            result,
            termination_reason: TerminationReason::Exhausted,
            statistics,
        }
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
    pub fn statistics(&self) -> &BnbSolverStatistics {
        &self.statistics
    }

    #[inline]
    pub fn into_result(self) -> SolverResult<T> {
        self.result
    }
}

impl<T> From<BnbSolverOutcome<T>> for PortfolioSolverResult<T>
where
    T: PrimInt + Signed,
{
    fn from(val: BnbSolverOutcome<T>) -> Self {
        let nodes = val.statistics.nodes_explored;
        let result = match val.termination_reason {
            TerminationReason::OptimalityProven => {
                assert!(
                    matches!(val.result, SolverResult::Optimal(_)),
                    "called `BnbSolverOutcome::into()` with inconsistent state: termination reason is OptimalityProven but result is not Optimal"
                );
                match val.result {
                    SolverResult::Optimal(solution) => PortfolioSolverResult::optimal(solution),
                    _ => PortfolioSolverResult::infeasible(),
                }
            }
            TerminationReason::InfeasibilityProven => PortfolioSolverResult::infeasible(),
            TerminationReason::Exhausted => match val.result {
                SolverResult::Feasible(solution) | SolverResult::Optimal(solution) => {
                    PortfolioSolverResult::exhausted(Some(solution))
                }
                _ => PortfolioSolverResult::exhausted(None),
            },
            TerminationReason::Aborted(reason) => match val.result {
                SolverResult::Feasible(solution) | SolverResult::Optimal(solution) => {
                    PortfolioSolverResult::aborted(Some(solution), reason)
                }
                _ => PortfolioSolverResult::aborted(None, reason),
            },
        };
        result.with_nodes_explored(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_model::{
        index::ContainerIndex,
        orientation::{Extents, Orientation},
        solution::Placement,
    };

    type IntegerType = i64;

    fn stats(nodes: u64) -> BnbSolverStatistics {
        BnbSolverStatistics {
            nodes_explored: nodes,
            ..Default::default()
        }
    }

    fn solution() -> Solution<IntegerType> {
        Solution::new(vec![Placement::new(
            ContainerIndex::new(0),
            Orientation::Lwh,
            (0, 0, 0),
            Extents::new(1, 1, 1),
        )])
    }

    #[test]
    fn test_into_portfolio_optimal_carries_nodes() {
        let outcome = BnbSolverOutcome::optimal(solution(), stats(7));
        let portfolio: PortfolioSolverResult<IntegerType> = outcome.into();
        assert!(matches!(portfolio.result(), SolverResult::Optimal(_)));
        assert!(portfolio.is_proof());
        assert_eq!(portfolio.nodes_explored(), 7);
    }

    #[test]
    fn test_into_portfolio_infeasible_maps_correctly() {
        let outcome = BnbSolverOutcome::<IntegerType>::infeasible(stats(1));
        let portfolio: PortfolioSolverResult<IntegerType> = outcome.into();

        assert!(matches!(portfolio.result(), SolverResult::Infeasible));
        assert!(matches!(
            portfolio.termination_reason(),
            TerminationReason::InfeasibilityProven
        ));
    }

    #[test]
    fn test_aborted_without_solution_is_unknown() {
        let outcome = BnbSolverOutcome::<IntegerType>::aborted(None, "time limit", stats(0));
        assert!(matches!(outcome.result(), SolverResult::Unknown));

        let portfolio: PortfolioSolverResult<IntegerType> = outcome.into();
        assert!(matches!(portfolio.result(), SolverResult::Unknown));
        assert!(!portfolio.is_proof());
        match portfolio.termination_reason() {
            TerminationReason::Aborted(msg) => assert_eq!(msg, "time limit"),
            other => panic!("expected Aborted termination reason, got {:?}", other),
        }
    }

    #[test]
    fn test_aborted_with_solution_is_feasible() {
        let outcome = BnbSolverOutcome::aborted(Some(solution()), "interrupted", stats(3));
        let portfolio: PortfolioSolverResult<IntegerType> = outcome.into();
        assert!(matches!(portfolio.result(), SolverResult::Feasible(_)));
    }

    #[test]
    fn test_exhausted_is_finished_without_proof() {
        let outcome = BnbSolverOutcome::exhausted(Some(solution()), stats(5));
        assert!(matches!(outcome.result(), SolverResult::Feasible(_)));

        let portfolio: PortfolioSolverResult<IntegerType> = outcome.into();
        assert!(matches!(portfolio.result(), SolverResult::Feasible(_)));
        assert!(portfolio.is_finished());
        assert!(!portfolio.is_proof());
        assert_eq!(portfolio.nodes_explored(), 5);

        let empty = BnbSolverOutcome::<IntegerType>::exhausted(None, stats(2));
        assert!(matches!(empty.result(), SolverResult::Unknown));
        assert_eq!(empty.termination_reason(), &TerminationReason::Exhausted);
    }

    #[test]
    #[should_panic(expected = "termination reason is OptimalityProven but result is not Optimal")]
    fn test_into_portfolio_optimality_invariant_panics_on_inconsistent_state() {
        let inconsistent = BnbSolverOutcome::<IntegerType> {
            result: SolverResult::Infeasible,
            termination_reason: TerminationReason::OptimalityProven,
            statistics: stats(0),
        };
        let _portfolio: PortfolioSolverResult<IntegerType> = inconsistent.into();
    }
}
