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

use crate::stats::SolverStatistics;
use num_traits::{PrimInt, Signed};
use stowage_model::solution::Solution;

/// What a search produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverResult<T> {
    /// Proven that no packing exists.
    Infeasible,
    /// A packing proven to be the best one.
    Optimal(Solution<T>),
    /// A packing found before the search was cut short.
    Feasible(Solution<T>),
    /// The search was cut short before any packing was found.
    Unknown,
}

impl<T> SolverResult<T> {
    #[inline]
    pub fn solution(&self) -> Option<&Solution<T>> {
        match self {
            SolverResult::Optimal(s) | SolverResult::Feasible(s) => Some(s),
            SolverResult::Infeasible | SolverResult::Unknown => None,
        }
    }

    /// The status label used in logs and run summaries.
    #[inline]
    pub fn status(&self) -> &'static str {
        match self {
            SolverResult::Infeasible => "infeasible",
            SolverResult::Optimal(_) => "optimal",
            SolverResult::Feasible(_) => "feasible",
            SolverResult::Unknown => "unknown",
        }
    }
}

impl<T> std::fmt::Display for SolverResult<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverResult::Infeasible => write!(f, "Infeasible"),
            SolverResult::Optimal(solution) => {
                write!(f, "Optimal(objective={})", solution.objective())
            }
            SolverResult::Feasible(solution) => {
                write!(f, "Feasible(objective={})", solution.objective())
            }
            SolverResult::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Why a search stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    OptimalityProven,
    InfeasibilityProven,
    /// Every candidate was explored, but the candidates left out placements,
    /// so running out of them proves nothing.
    Exhausted,
    Aborted(String),
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "Optimality Proven"),
            TerminationReason::InfeasibilityProven => write!(f, "Infeasibility Proven"),
            TerminationReason::Exhausted => write!(f, "Exhausted Without Proof"),
            TerminationReason::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOutcome<T> {
    pub result: SolverResult<T>,
    pub reason: TerminationReason,
    pub statistics: SolverStatistics,
}

impl<T> SolverOutcome<T> {
    #[inline]
    pub fn new(result: SolverResult<T>, reason: TerminationReason, statistics: SolverStatistics) -> Self {
        Self {
            result,
            reason,
            statistics,
        }
    }

    #[inline]
    pub fn optimal(solution: Solution<T>, statistics: SolverStatistics) -> Self {
        Self::new(
            SolverResult::Optimal(solution),
            TerminationReason::OptimalityProven,
            statistics,
        )
    }

    #[inline]
    pub fn feasible<R>(solution: Solution<T>, reason: R, statistics: SolverStatistics) -> Self
    where
        R: Into<String>,
    {
        Self::new(
            SolverResult::Feasible(solution),
            TerminationReason::Aborted(reason.into()),
            statistics,
        )
    }

    /// The restricted search ran out of candidates, holding `solution` if it
    /// found one.
    #[inline]
    pub fn exhausted(solution: Option<Solution<T>>, statistics: SolverStatistics) -> Self {
        let result = match solution {
            Some(sol) => SolverResult::Feasible(sol),
            None => SolverResult::Unknown,
        };
        Self::new(result, TerminationReason::Exhausted, statistics)
    }

    #[inline]
    pub fn infeasible(statistics: SolverStatistics) -> Self {
        Self::new(
            SolverResult::Infeasible,
            TerminationReason::InfeasibilityProven,
            statistics,
        )
    }

    #[inline]
    pub fn unknown<R>(reason: R, statistics: SolverStatistics) -> Self
    where
        R: Into<String>,
    {
        Self::new(
            SolverResult::Unknown,
            TerminationReason::Aborted(reason.into()),
            statistics,
        )
    }

    #[inline]
    pub fn result(&self) -> &SolverResult<T> {
        &self.result
    }

    #[inline]
    pub fn reason(&self) -> &TerminationReason {
        &self.reason
    }

    #[inline]
    pub fn statistics(&self) -> &SolverStatistics {
        &self.statistics
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_))
    }

    #[inline]
    pub fn is_feasible(&self) -> bool {
        matches!(self.result, SolverResult::Feasible(_))
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self.result, SolverResult::Infeasible)
    }

    #[inline]
    pub fn has_solution(&self) -> bool {
        self.result.solution().is_some()
    }

    #[inline]
    pub fn solution(&self) -> Option<&Solution<T>> {
        self.result.solution()
    }
}

impl<T> std::fmt::Display for SolverOutcome<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Result: {}", self.result)?;
        writeln!(f, "Termination: {}", self.reason)?;
        write!(f, "{}", self.statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::SolverStatisticsBuilder;

    type IntegerType = i64;

    #[test]
    fn test_status_labels_and_solution_access() {
        let sol = Solution::<IntegerType>::new(Vec::new());
        assert_eq!(SolverResult::Optimal(sol.clone()).status(), "optimal");
        assert_eq!(SolverResult::Feasible(sol.clone()).status(), "feasible");
        assert_eq!(SolverResult::<IntegerType>::Infeasible.status(), "infeasible");
        assert_eq!(SolverResult::<IntegerType>::Unknown.status(), "unknown");
        assert_eq!(SolverResult::Feasible(sol.clone()).solution(), Some(&sol));
        assert_eq!(SolverResult::<IntegerType>::Unknown.solution(), None);
    }

    #[test]
    fn test_outcome_predicates() {
        let stats = SolverStatisticsBuilder::new().build();
        let o = SolverOutcome::<IntegerType>::new(
            SolverResult::Unknown,
            TerminationReason::Aborted("time limit reached".into()),
            stats,
        );
        assert!(!o.has_solution());
        assert!(!o.is_infeasible());
        assert!(!o.is_optimal());
        assert!(!o.is_feasible());

        let o = SolverOutcome::<IntegerType>::feasible(
            Solution::new(Vec::new()),
            "solution limit reached",
            SolverStatisticsBuilder::new().build(),
        );
        assert!(o.is_feasible());
        assert!(o.has_solution());
        assert_eq!(
            o.reason(),
            &TerminationReason::Aborted("solution limit reached".into())
        );

        let o = SolverOutcome::<IntegerType>::exhausted(None, SolverStatisticsBuilder::new().build());
        assert!(!o.has_solution());
        assert!(!o.is_infeasible());
        assert_eq!(o.result().status(), "unknown");

        let o = SolverOutcome::<IntegerType>::infeasible(SolverStatisticsBuilder::new().build());
        assert!(o.is_infeasible());
        assert_eq!(o.reason(), &TerminationReason::InfeasibilityProven);
    }

    #[test]
    fn test_display() {
        let sol = Solution::<IntegerType>::new(Vec::new());
        assert_eq!(
            SolverResult::Optimal(sol).to_string(),
            "Optimal(objective=(containers: 0, coordinate sum: 0))"
        );
        assert_eq!(
            TerminationReason::Aborted("time limit reached".into()).to_string(),
            "Aborted: time limit reached"
        );
        assert_eq!(
            TerminationReason::Exhausted.to_string(),
            "Exhausted Without Proof"
        );
    }
}
