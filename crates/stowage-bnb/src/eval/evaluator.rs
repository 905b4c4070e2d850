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

use crate::state::SearchState;
use num_traits::{PrimInt, Signed};
use stowage_model::{model::Model, objective::Objective, solution::Placement};

/// A strategy for scoring decisions and bounding subtrees.
///
/// The engine calls:
/// - `evaluate_placement` for the objective of the partial packing after one
///   more placement. It must never be smaller than the objective before it.
/// - `lower_bound` for an objective no completion of the current node can beat.
///   Branches are pruned when the bound is not strictly better than the
///   incumbent, so it must never overestimate.
///
/// `None` marks an infeasible placement or subtree.
pub trait ObjectiveEvaluator<T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str;

    fn evaluate_placement(
        &mut self,
        model: &Model<T>,
        state: &SearchState<T>,
        placement: &Placement<T>,
    ) -> Option<Objective<T>>;

    /// The number of containers the unplaced objects need on top of the ones
    /// already in use.
    fn estimate_remaining_containers(
        &mut self,
        model: &Model<T>,
        state: &SearchState<T>,
    ) -> Option<usize>;

    /// The default bound adds the remaining containers to the containers in
    /// use and keeps the current coordinate sum, since coordinates are never
    /// negative.
    fn lower_bound(&mut self, model: &Model<T>, state: &SearchState<T>) -> Option<Objective<T>> {
        let extra = self.estimate_remaining_containers(model, state)?;
        Some(Objective::new(
            state.used_containers().saturating_add(extra),
            state.coordinate_sum(),
        ))
    }
}

impl<T> std::fmt::Debug for dyn ObjectiveEvaluator<T>
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectiveEvaluator({})", self.name())
    }
}

impl<T> std::fmt::Display for dyn ObjectiveEvaluator<T>
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectiveEvaluator({})", self.name())
    }
}
