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

//! Branching decisions.
//!
//! A [`Decision`] places one object: it carries the full [`Placement`], the
//! objective of the partial packing right after it, and whether it opens a
//! pending support obligation. Decisions are built and checked against the
//! node they were generated at, and the engine always applies them at that
//! same node, so they never go stale.

use crate::{
    constraints::PlacementConstraints, eval::evaluator::ObjectiveEvaluator, state::SearchState,
};
use num_traits::{PrimInt, Signed};
use std::iter::FusedIterator;
use stowage_model::{
    index::ObjectIndex, model::Model, objective::Objective, solution::Placement,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decision<T> {
    placement: Placement<T>,
    objective: Objective<T>,
    object_index: ObjectIndex,
    pending: bool,
}

impl<T> Decision<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new(
        object_index: ObjectIndex,
        placement: Placement<T>,
        objective: Objective<T>,
        pending: bool,
    ) -> Self {
        Self {
            placement,
            objective,
            object_index,
            pending,
        }
    }

    /// Builds the decision to place `object_index` at `placement`, or `None`
    /// if the placement violates a constraint or the evaluator rejects it.
    pub fn try_new<E>(
        object_index: ObjectIndex,
        placement: Placement<T>,
        model: &Model<T>,
        constraints: &PlacementConstraints<T>,
        state: &SearchState<T>,
        evaluator: &mut E,
    ) -> Option<Self>
    where
        E: ObjectiveEvaluator<T>,
    {
        debug_assert!(
            object_index.get() < model.num_objects(),
            "called `Decision::try_new` with object index out of bounds: the len is {} but the index is {}",
            model.num_objects(),
            object_index.get()
        );

        if state.is_object_assigned(object_index) {
            return None;
        }

        let check = constraints.check(model, state, object_index, &placement)?;
        let objective = evaluator.evaluate_placement(model, state, &placement)?;

        Some(Self::new(object_index, placement, objective, check.is_pending()))
    }

    #[inline(always)]
    pub fn object_index(&self) -> ObjectIndex {
        self.object_index
    }

    #[inline(always)]
    pub fn placement(&self) -> &Placement<T> {
        &self.placement
    }

    /// The objective of the partial packing after this decision.
    #[inline(always)]
    pub fn objective(&self) -> Objective<T> {
        self.objective
    }

    /// Returns `true` if the object is placed without a supporter yet.
    #[inline(always)]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

impl<T> std::fmt::Display for Decision<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Decision(object: {}, container: {}, origin: ({}, {}, {}), orientation: {}{})",
            self.object_index,
            self.placement.container(),
            self.placement.x(),
            self.placement.y(),
            self.placement.z(),
            self.placement.orientation(),
            if self.pending { ", pending" } else { "" }
        )
    }
}

/// Generates the children of a search node.
///
/// Implementations yield decisions best first; the engine explores them in
/// the order yielded.
pub trait DecisionBuilder<T, E>
where
    T: PrimInt + Signed,
    E: ObjectiveEvaluator<T>,
{
    type DecisionIterator<'a>: Iterator<Item = Decision<T>> + FusedIterator + 'a
    where
        Self: 'a,
        T: 'a,
        E: 'a;

    fn name(&self) -> &str;

    /// Returns `false` if the last call to `next_decision` left out feasible
    /// placements. Running out of decisions in a tree with such nodes proves
    /// neither optimality nor infeasibility.
    fn is_last_expansion_exhaustive(&self) -> bool {
        true
    }

    fn next_decision<'a>(
        &'a mut self,
        evaluator: &'a mut E,
        model: &'a Model<T>,
        constraints: &'a PlacementConstraints<T>,
        state: &'a SearchState<T>,
    ) -> Self::DecisionIterator<'a>;
}
