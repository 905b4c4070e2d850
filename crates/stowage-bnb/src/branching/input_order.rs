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

//! Input order branching.
//!
//! Branches on the first unplaced object in input order, over the containers
//! in use plus the next empty one (empty containers are interchangeable, so
//! only one is ever tried) and the object's distinct fitting orientations.
//! Positions come from one of two domains:
//! - the full integer grid, while it holds at most [`GRID_POSITION_LIMIT`]
//!   positions summed over containers and orientations. Nothing is left out.
//! - extreme points otherwise: the origin, the corners a placed object
//!   exposes beside and above itself (also dropped to the floor), positions
//!   flush with the far edges of its top face or directly in front of it,
//!   and the slots beneath pending objects. Every point is also lifted by the
//!   [`DEFERRED_LEVELS`] smallest sums of heights that other unplaced objects
//!   could stack up beneath it later. Positions in open containers are
//!   checked cheapest first, at most [`MAX_CHECKS`] of them, keeping at most
//!   [`MAX_CANDIDATES`]; those in the empty container are always checked.
//!   Such an expansion is not exhaustive.
//!
//! Survivors are ordered with supported placements before pending ones, open
//! containers before the empty one, then by ascending `x + y + z`. The empty
//! container always admits a supported placement at its origin, so the first
//! dive reaches a leaf without backtracking.

use crate::{
    branching::decision::{Decision, DecisionBuilder},
    constraints::PlacementConstraints,
    eval::evaluator::ObjectiveEvaluator,
    state::SearchState,
};
use num_traits::{PrimInt, Signed};
use smallvec::{SmallVec, smallvec};
use std::iter::FusedIterator;
use stowage_model::{
    index::{ContainerIndex, ObjectIndex},
    model::Model,
    orientation::Extents,
    solution::Placement,
};

pub const GRID_POSITION_LIMIT: u64 = 4096;
pub const DEFERRED_LEVELS: usize = 8;
pub const MAX_CANDIDATES: usize = 128;
pub const MAX_CHECKS: usize = 4096;

type Coordinates<T> = SmallVec<[T; 16]>;
type Position<T> = (T, T, T);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate<T> {
    decision: Decision<T>,
    opens_container: bool,
}

impl<T> Candidate<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    fn key(&self) -> (bool, bool, T, usize, usize, T, T, T) {
        let p = self.decision.placement();
        (
            self.decision.is_pending(),
            self.opens_container,
            p.coordinate_sum(),
            p.container().get(),
            p.orientation().index(),
            p.z(),
            p.y(),
            p.x(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct InputOrderBuilder<T> {
    candidates: Vec<Candidate<T>>,
    /// Extreme points in open containers, and in the empty one.
    positions: Vec<Placement<T>>,
    fresh: Vec<Placement<T>>,
    exhaustive: bool,
}

impl<T> Default for InputOrderBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InputOrderBuilder<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            positions: Vec::new(),
            fresh: Vec::new(),
            exhaustive: true,
        }
    }

    #[inline]
    pub fn with_capacity(size: usize) -> Self {
        Self {
            candidates: Vec::with_capacity(size),
            positions: Vec::with_capacity(size),
            fresh: Vec::new(),
            exhaustive: true,
        }
    }
}

fn sorted_unique<T: Ord>(mut values: Coordinates<T>) -> Coordinates<T> {
    values.sort_unstable();
    values.dedup();
    values
}

/// `0, 1, ..., max`; empty if `max` is negative.
fn span<T>(max: T) -> impl Iterator<Item = T>
where
    T: PrimInt + Signed,
{
    std::iter::successors((max >= T::zero()).then(T::zero), move |&v| {
        (v < max).then(|| v + T::one())
    })
}

impl<T> InputOrderBuilder<T>
where
    T: PrimInt + Signed,
{
    /// Number of grid positions of `object_index` over `containers` containers.
    fn grid_size(
        constraints: &PlacementConstraints<T>,
        object_index: ObjectIndex,
        base: Extents<T>,
        containers: usize,
    ) -> u64 {
        let limits = constraints.container_extents();
        let slots = |limit: T, len: T| {
            (limit - len)
                .to_u64()
                .map_or(u64::MAX, |s| s.saturating_add(1))
        };

        constraints
            .orientations(object_index)
            .iter()
            .map(|&orientation| {
                let e = base.oriented(orientation);
                slots(limits.length(), e.length())
                    .saturating_mul(slots(limits.width(), e.width()))
                    .saturating_mul(slots(limits.height(), e.height()))
            })
            .fold(0u64, u64::saturating_add)
            .saturating_mul(containers as u64)
    }

    /// The [`DEFERRED_LEVELS`] smallest positive heights, up to the container
    /// height, that a stack of other unplaced objects could fill.
    fn deferred_heights(
        model: &Model<T>,
        constraints: &PlacementConstraints<T>,
        state: &SearchState<T>,
        object_index: ObjectIndex,
    ) -> Coordinates<T> {
        let limit = constraints.container_extents().height();

        // Subset sums, one height per object. Keeping the smallest few of each
        // prefix keeps the smallest few overall.
        let mut sums: Coordinates<T> = smallvec![T::zero()];
        for other in state.unassigned_objects().filter(|&o| o != object_index) {
            let base = model.object_extents(other);
            let mut next = sums.clone();
            for &orientation in constraints.orientations(other) {
                let height = base.oriented(orientation).height();
                next.extend(
                    sums.iter()
                        .filter_map(|s| s.checked_add(&height))
                        .filter(|s| *s <= limit),
                );
            }
            sums = sorted_unique(next);
            sums.truncate(DEFERRED_LEVELS + 1);
        }

        sums.into_iter().skip(1).collect()
    }

    /// Extreme points of `container` for a box of `extents`, lifted by
    /// `lifts` and clipped to the container.
    fn extreme_points(
        state: &SearchState<T>,
        limits: Extents<T>,
        container: ContainerIndex,
        extents: Extents<T>,
        lifts: &[T],
        out: &mut Vec<Position<T>>,
    ) {
        let zero = T::zero();
        let (l, w, h) = extents.as_tuple();
        let first = out.len();

        out.push((zero, zero, zero));
        for (other, p) in state.objects_in(container) {
            let (x0, y0, z0) = p.origin();
            let (x1, y1, z1) = p.max_corner();
            out.extend([
                (x1, y0, z0),
                (x0, y1, z0),
                (x0, y0, z1),
                (x1, y0, zero),
                (x0, y1, zero),
                (x1 - l, y0, z1),
                (x0, y1 - w, z1),
                (x1 - l, y1 - w, z1),
                (x0 - l, y0, z0),
                (x0, y0 - w, z0),
            ]);
            if state.is_pending(other) {
                let below = z0 - h;
                out.extend([
                    (x0, y0, below),
                    (x1 - l, y0, below),
                    (x0, y1 - w, below),
                    (x1 - l, y1 - w, below),
                ]);
            }
        }

        let anchors = out.len();
        for i in first..anchors {
            let (x, y, z) = out[i];
            out.extend(
                lifts
                    .iter()
                    .filter_map(|s| z.checked_add(s))
                    .map(|lifted| (x, y, lifted)),
            );
        }

        let fits = |start: T, len: T, limit: T| {
            start >= zero && start.checked_add(&len).is_some_and(|end| end <= limit)
        };
        let mut i = first;
        while i < out.len() {
            let (x, y, z) = out[i];
            if fits(x, l, limits.length()) && fits(y, w, limits.width()) && fits(z, h, limits.height())
            {
                i += 1;
            } else {
                out.swap_remove(i);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    #[inline]
    fn try_push<E>(
        &mut self,
        evaluator: &mut E,
        model: &Model<T>,
        constraints: &PlacementConstraints<T>,
        state: &SearchState<T>,
        object_index: ObjectIndex,
        placement: Placement<T>,
        opens_container: bool,
    ) -> bool
    where
        E: ObjectiveEvaluator<T>,
    {
        match Decision::try_new(object_index, placement, model, constraints, state, evaluator) {
            Some(decision) => {
                self.candidates.push(Candidate {
                    decision,
                    opens_container,
                });
                true
            }
            None => false,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn expand_grid<E>(
        &mut self,
        evaluator: &mut E,
        model: &Model<T>,
        constraints: &PlacementConstraints<T>,
        state: &SearchState<T>,
        object_index: ObjectIndex,
        last: usize,
        open: usize,
    ) where
        E: ObjectiveEvaluator<T>,
    {
        let base = model.object_extents(object_index);
        let limits = constraints.container_extents();

        for c in 0..=last {
            let container = ContainerIndex::new(c);
            for &orientation in constraints.orientations(object_index) {
                let (l, w, h) = base.oriented(orientation).as_tuple();
                for z in span(limits.height() - h) {
                    for y in span(limits.width() - w) {
                        for x in span(limits.length() - l) {
                            let placement = Placement::new(container, orientation, (x, y, z), base);
                            self.try_push(
                                evaluator,
                                model,
                                constraints,
                                state,
                                object_index,
                                placement,
                                c == open,
                            );
                        }
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn expand_extreme_points<E>(
        &mut self,
        evaluator: &mut E,
        model: &Model<T>,
        constraints: &PlacementConstraints<T>,
        state: &SearchState<T>,
        object_index: ObjectIndex,
        last: usize,
        open: usize,
    ) where
        E: ObjectiveEvaluator<T>,
    {
        let base = model.object_extents(object_index);
        let limits = constraints.container_extents();
        let lifts = Self::deferred_heights(model, constraints, state, object_index);

        self.positions.clear();
        self.fresh.clear();
        let mut points: Vec<Position<T>> = Vec::new();
        for c in 0..=last {
            let container = ContainerIndex::new(c);
            for &orientation in constraints.orientations(object_index) {
                points.clear();
                Self::extreme_points(
                    state,
                    limits,
                    container,
                    base.oriented(orientation),
                    &lifts,
                    &mut points,
                );
                points.sort_unstable();
                points.dedup();
                let target = if c == open {
                    &mut self.fresh
                } else {
                    &mut self.positions
                };
                target.extend(
                    points
                        .iter()
                        .map(|&origin| Placement::new(container, orientation, origin, base)),
                );
            }
        }

        // Only the cheapest `MAX_CHECKS` can ever be checked.
        let key = |p: &Placement<T>| {
            (
                p.coordinate_sum(),
                p.container().get(),
                p.orientation().index(),
                p.z(),
                p.y(),
                p.x(),
            )
        };
        if self.positions.len() > MAX_CHECKS {
            self.positions.select_nth_unstable_by_key(MAX_CHECKS, key);
            self.positions.truncate(MAX_CHECKS);
        }
        self.positions.sort_unstable_by_key(key);

        let mut kept = 0;
        for i in 0..self.positions.len() {
            if kept >= MAX_CANDIDATES {
                break;
            }
            let placement = self.positions[i];
            if self.try_push(evaluator, model, constraints, state, object_index, placement, false) {
                kept += 1;
            }
        }
        for i in 0..self.fresh.len() {
            let placement = self.fresh[i];
            self.try_push(evaluator, model, constraints, state, object_index, placement, true);
        }
    }
}

impl<T, E> DecisionBuilder<T, E> for InputOrderBuilder<T>
where
    T: PrimInt + Signed,
    E: ObjectiveEvaluator<T>,
{
    type DecisionIterator<'a>
        = InputOrderIter<'a, T>
    where
        T: 'a,
        E: 'a,
        Self: 'a;

    fn name(&self) -> &str {
        "InputOrderBuilder"
    }

    fn is_last_expansion_exhaustive(&self) -> bool {
        self.exhaustive
    }

    fn next_decision<'a>(
        &'a mut self,
        evaluator: &'a mut E,
        model: &'a Model<T>,
        constraints: &'a PlacementConstraints<T>,
        state: &'a SearchState<T>,
    ) -> Self::DecisionIterator<'a> {
        self.candidates.clear();
        self.exhaustive = true;

        if let Some(object_index) = state.first_unassigned() {
            let open = state.used_containers();
            let last = open.min(model.num_objects().saturating_sub(1));
            let base = model.object_extents(object_index);

            if Self::grid_size(constraints, object_index, base, last + 1) <= GRID_POSITION_LIMIT {
                self.expand_grid(evaluator, model, constraints, state, object_index, last, open);
            } else {
                self.exhaustive = false;
                self.expand_extreme_points(
                    evaluator,
                    model,
                    constraints,
                    state,
                    object_index,
                    last,
                    open,
                );
            }

            self.candidates.sort_by_key(Candidate::key);
        }

        InputOrderIter {
            iter: self.candidates.iter(),
        }
    }
}

pub struct InputOrderIter<'a, T> {
    iter: std::slice::Iter<'a, Candidate<T>>,
}

impl<'a, T> Iterator for InputOrderIter<'a, T>
where
    T: Copy,
{
    type Item = Decision<T>;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|c| c.decision)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, T> FusedIterator for InputOrderIter<'a, T> where T: Copy {}
