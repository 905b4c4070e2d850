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

use crate::IntegerType;
use serde::Serialize;
use std::path::Path;
use stowage_model::model::Model;
use stowage_search::result::SolverOutcome;

/// Machine-readable account of one run.
///
/// Unlike the result file, `status` separates proven results from packings
/// found before a limit was hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub instance: String,
    pub num_objects: usize,
    /// `optimal`, `feasible`, `infeasible` or `unknown`.
    pub status: String,
    pub termination: String,
    pub containers: Option<usize>,
    pub coordinate_sum: Option<IntegerType>,
    /// `None` when there is no packing or the scalar overflows.
    pub legacy_objective: Option<IntegerType>,
    pub container_lower_bound: usize,
    pub seeded: bool,
    pub workers: usize,
    pub nodes_explored: u64,
    pub solutions_found: u64,
    pub solve_seconds: f64,
}

impl RunSummary {
    pub fn from_outcome(
        instance: &Path,
        model: &Model<IntegerType>,
        outcome: &SolverOutcome<IntegerType>,
        legacy_weight: IntegerType,
        seeded: bool,
    ) -> Self {
        let objective = outcome.solution().map(|s| s.objective());
        let stats = outcome.statistics();
        Self {
            instance: instance.display().to_string(),
            num_objects: model.num_objects(),
            status: outcome.result().status().to_string(),
            termination: outcome.reason().to_string(),
            containers: objective.map(|o| o.containers()),
            coordinate_sum: objective.map(|o| o.coordinate_sum()),
            legacy_objective: objective.and_then(|o| o.legacy_scalar(legacy_weight)),
            container_lower_bound: model.min_containers_by_volume(),
            seeded,
            workers: stats.used_threads,
            nodes_explored: stats.nodes_explored,
            solutions_found: stats.solutions_found,
            solve_seconds: stats.solve_duration.as_secs_f64(),
        }
    }

    /// A run that stopped before searching because `reason` makes the
    /// instance unpackable.
    pub fn rejected(instance: &Path, model: &Model<IntegerType>, reason: String) -> Self {
        Self {
            instance: instance.display().to_string(),
            num_objects: model.num_objects(),
            status: "infeasible".to_string(),
            termination: reason,
            containers: None,
            coordinate_sum: None,
            legacy_objective: None,
            container_lower_bound: model.min_containers_by_volume(),
            seeded: false,
            workers: 0,
            nodes_explored: 0,
            solutions_found: 0,
            solve_seconds: 0.0,
        }
    }

    #[inline]
    pub fn is_sat(&self) -> bool {
        self.containers.is_some()
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.status, self.termination)?;
        if let (Some(containers), Some(sum)) = (self.containers, self.coordinate_sum) {
            write!(f, ", {} container(s), coordinate sum {}", containers, sum)?;
        }
        write!(
            f,
            ", {} nodes in {:.3}s",
            self.nodes_explored, self.solve_seconds
        )
    }
}
