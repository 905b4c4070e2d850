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

//! Lexicographic objective evaluation.
//!
//! Ranks packings by containers used, then by `Σx + Σy + Σz`. The bound on
//! containers is volumetric: whatever volume the unplaced objects cannot put
//! into the free space of the open containers needs new containers.

use crate::{eval::evaluator::ObjectiveEvaluator, state::SearchState};
use num_traits::{PrimInt, Signed};
use stowage_model::{model::Model, objective::Objective, solution::Placement};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexicographicEvaluator<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> LexicographicEvaluator<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> ObjectiveEvaluator<T> for LexicographicEvaluator<T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "LexicographicEvaluator"
    }

    #[inline]
    fn evaluate_placement(
        &mut self,
        _model: &Model<T>,
        state: &SearchState<T>,
        placement: &Placement<T>,
    ) -> Option<Objective<T>> {
        let containers = state
            .used_containers()
            .max(placement.container().get() + 1);
        let coordinate_sum = state
            .coordinate_sum()
            .checked_add(&placement.coordinate_sum())?;
        Some(Objective::new(containers, coordinate_sum))
    }

    #[inline]
    fn estimate_remaining_containers(
        &mut self,
        model: &Model<T>,
        state: &SearchState<T>,
    ) -> Option<usize> {
        let container_volume = model.container_volume();
        if container_volume == 0 {
            return None;
        }

        let unplaced = model
            .total_object_volume()
            .saturating_sub(state.placed_volume());
        let free = (state.used_containers() as u128)
            .saturating_mul(container_volume)
            .saturating_sub(state.placed_volume());
        let overflow = unplaced.saturating_sub(free);

        usize::try_from(overflow.div_ceil(container_volume)).ok()
    }
}
