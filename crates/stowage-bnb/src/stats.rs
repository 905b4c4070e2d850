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

use std::time::Duration;

/// Statistics collected during one run of the branch-and-bound engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BnbSolverStatistics {
    /// Total nodes visited, the root included.
    pub nodes_explored: u64,
    /// Total returns from a node to its parent.
    pub backtracks: u64,
    /// Total decisions taken off the stack.
    pub decisions_generated: u64,
    /// The deepest level reached in the tree.
    pub max_depth: u64,
    /// Pruned because a constraint could no longer be met, e.g. a leaf with
    /// an object still waiting for support.
    pub prunings_infeasible: u64,
    /// Pruned because the decision objective or the node bound could not
    /// beat the incumbent, local or shared.
    pub prunings_bound: u64,
    /// Improving solutions found by this run.
    pub solutions_found: u64,
    pub time_total: Duration,
    /// Containers needed at the root according to the evaluator's bound.
    pub root_container_bound: usize,
    /// Expansions whose decisions left out feasible placements. Any such
    /// expansion voids an exhausted run's proof.
    pub restricted_expansions: u64,
}

impl BnbSolverStatistics {
    #[inline]
    pub fn on_node_explored(&mut self) {
        self.nodes_explored = self.nodes_explored.saturating_add(1);
    }

    #[inline]
    pub fn on_backtrack(&mut self) {
        self.backtracks = self.backtracks.saturating_add(1);
    }

    #[inline]
    pub fn on_solution_found(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    #[inline]
    pub fn on_depth_update(&mut self, depth: u64) {
        self.max_depth = self.max_depth.max(depth);
    }

    #[inline]
    pub fn on_decision_generated(&mut self) {
        self.decisions_generated = self.decisions_generated.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_infeasible(&mut self) {
        self.prunings_infeasible = self.prunings_infeasible.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline]
    pub fn on_restricted_expansion(&mut self) {
        self.restricted_expansions = self.restricted_expansions.saturating_add(1);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    #[inline]
    pub fn set_root_container_bound(&mut self, bound: usize) {
        self.root_container_bound = bound;
    }
}

impl std::fmt::Display for BnbSolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Stowage-BnB Solver Statistics:")?;
        writeln!(f, "  Nodes explored:       {}", self.nodes_explored)?;
        writeln!(f, "  Backtracks:           {}", self.backtracks)?;
        writeln!(f, "  Max depth reached:    {}", self.max_depth)?;
        writeln!(f, "  Decisions generated:  {}", self.decisions_generated)?;
        writeln!(f, "  Prunings (infeasible):{}", self.prunings_infeasible)?;
        writeln!(f, "  Prunings (bound):     {}", self.prunings_bound)?;
        writeln!(f, "  Solutions found:      {}", self.solutions_found)?;
        writeln!(f, "  Root container bound: {}", self.root_container_bound)?;
        writeln!(f, "  Restricted expansions:{}", self.restricted_expansions)?;
        writeln!(f, "  Total time:           {:.2?}", self.time_total)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut s = BnbSolverStatistics::default();
        s.on_node_explored();
        s.on_node_explored();
        s.on_backtrack();
        s.on_depth_update(3);
        s.on_depth_update(1);
        s.on_pruning_bound();
        s.on_pruning_infeasible();
        s.on_decision_generated();
        s.on_solution_found();
        s.set_root_container_bound(2);
        s.on_restricted_expansion();

        assert_eq!(s.nodes_explored, 2);
        assert_eq!(s.backtracks, 1);
        assert_eq!(s.max_depth, 3);
        assert_eq!(s.prunings_bound, 1);
        assert_eq!(s.prunings_infeasible, 1);
        assert_eq!(s.decisions_generated, 1);
        assert_eq!(s.solutions_found, 1);
        assert_eq!(s.root_container_bound, 2);
        assert_eq!(s.restricted_expansions, 1);
    }

    #[test]
    fn test_counters_saturate() {
        let mut s = BnbSolverStatistics {
            nodes_explored: u64::MAX,
            ..Default::default()
        };
        s.on_node_explored();
        assert_eq!(s.nodes_explored, u64::MAX);
    }

    #[test]
    fn test_display_header() {
        let text = BnbSolverStatistics::default().to_string();
        assert!(text.starts_with("Stowage-BnB Solver Statistics:"));
        assert!(text.contains("Root container bound: 0"));
        assert!(text.contains("Restricted expansions:0"));
    }
}
