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

//! Placement constraints.
//!
//! Turns a [`Model`] into the per-object constraint data the search needs and
//! answers one question for it: may this object take this placement given
//! what is already packed?
//!
//! Orientation choice is an explicit list per object: the distinct rotations
//! that fit an empty container. An object without any fitting rotation makes
//! the instance unpackable, which is reported as
//! [`ConstraintError::InvalidDimensions`] before the search starts.
//!
//! Pairwise non-overlap is the tagged choice [`Separation`]: two placements
//! either live in different containers or are separated along some axis in
//! some order. Support is the tagged choice [`Support`]: the floor, or the top
//! face of exactly one other object that fully contains the footprint.
//!
//! Objects are branched in input order, so an object may have to rest on an
//! object that is placed later. A placement above the floor without a placed
//! supporter is accepted as a *pending obligation* as long as the obligation
//! can still be met:
//! - some other unplaced object has a fitting rotation whose footprint covers
//!   the pending one and whose height is at most its `z`,
//! - the slab directly beneath the pending object, as deep as the lowest such
//!   rotation, is empty.
//!
//! Once no unplaced object is left, no obligation can be met, so a complete
//! packing never carries one.

use num_traits::{PrimInt, Signed};
use smallvec::SmallVec;
use stowage_core::math::{cuboid::Axis, cuboid::Cuboid, interval::ClosedOpenInterval};
use stowage_model::{
    index::ObjectIndex,
    model::Model,
    orientation::{Extents, Orientation},
    solution::Placement,
    validation::rests_on,
};

use crate::state::SearchState;

/// Raised when an object cannot be packed into an empty container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintError<T> {
    InvalidDimensions {
        object: ObjectIndex,
        extents: Extents<T>,
    },
}

impl<T> std::fmt::Display for ConstraintError<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDimensions { object, extents } => write!(
                f,
                "{} with extents {} does not fit the container in any orientation",
                object, extents
            ),
        }
    }
}

impl<T> std::error::Error for ConstraintError<T> where T: std::fmt::Display + std::fmt::Debug {}

/// Direction of a separation along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// The first box ends where or before the second starts.
    Before,
    /// The first box starts where or after the second ends.
    After,
}

/// How two placements avoid each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separation {
    DifferentContainer,
    Separated { axis: Axis, order: Order },
}

impl std::fmt::Display for Separation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DifferentContainer => write!(f, "different containers"),
            Self::Separated { axis, order } => {
                let order = match order {
                    Order::Before => "before",
                    Order::After => "after",
                };
                write!(f, "{} along {}", order, axis)
            }
        }
    }
}

/// Resolves the separation between `a` and `b`, or `None` if they overlap.
///
/// Axes are tried in the order x, y, z and `Before` is tried before `After`.
pub fn separation<T>(a: &Placement<T>, b: &Placement<T>) -> Option<Separation>
where
    T: PrimInt + Signed,
{
    if a.container() != b.container() {
        return Some(Separation::DifferentContainer);
    }

    let (ca, cb) = (a.cuboid(), b.cuboid());
    Axis::ALL.into_iter().find_map(|axis| {
        let (ia, ib) = (ca.along(axis), cb.along(axis));
        if ia.end() <= ib.start() {
            Some(Separation::Separated {
                axis,
                order: Order::Before,
            })
        } else if ib.end() <= ia.start() {
            Some(Separation::Separated {
                axis,
                order: Order::After,
            })
        } else {
            None
        }
    })
}

/// What an object rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Support {
    Floor,
    On(ObjectIndex),
}

impl std::fmt::Display for Support {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Floor => write!(f, "floor"),
            Self::On(object) => write!(f, "on {}", object),
        }
    }
}

/// Resolves the support of `candidate` among `placed`, or `None` if nothing
/// holds it up. The first supporter in iteration order wins.
pub fn support_of<'p, T, I>(candidate: &Placement<T>, placed: I) -> Option<Support>
where
    T: PrimInt + Signed + 'p,
    I: IntoIterator<Item = (ObjectIndex, &'p Placement<T>)>,
{
    if candidate.z() == T::zero() {
        return Some(Support::Floor);
    }

    placed
        .into_iter()
        .find(|(_, below)| rests_on(candidate, below))
        .map(|(object, _)| Support::On(object))
}

/// Outcome of a successful placement check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacementCheck {
    /// `None` if the placement opens a pending obligation.
    pub support: Option<Support>,
}

impl PlacementCheck {
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.support.is_none()
    }
}

/// Constraint data derived from a [`Model`].
#[derive(Debug, Clone)]
pub struct PlacementConstraints<T> {
    container: Extents<T>,
    orientations: Vec<SmallVec<[Orientation; 6]>>,
}

impl<T> PlacementConstraints<T>
where
    T: PrimInt + Signed,
{
    /// Collects the fitting orientations of every object.
    ///
    /// Rotations that produce the same effective extents are kept once, so a
    /// cube has a single orientation.
    pub fn build(model: &Model<T>) -> Result<Self, ConstraintError<T>> {
        let container = model.container_extents();
        let mut orientations = Vec::with_capacity(model.num_objects());

        for object in model.object_indices() {
            let base = model.object_extents(object);
            let mut fitting: SmallVec<[Orientation; 6]> = SmallVec::new();
            let mut seen: SmallVec<[Extents<T>; 6]> = SmallVec::new();

            for orientation in Orientation::ALL {
                let effective = base.oriented(orientation);
                if effective.fits_within(&container) && !seen.contains(&effective) {
                    seen.push(effective);
                    fitting.push(orientation);
                }
            }

            if fitting.is_empty() {
                return Err(ConstraintError::InvalidDimensions {
                    object,
                    extents: base,
                });
            }
            orientations.push(fitting);
        }

        Ok(Self {
            container,
            orientations,
        })
    }

    #[inline]
    pub fn container_extents(&self) -> Extents<T> {
        self.container
    }

    #[inline]
    pub fn num_objects(&self) -> usize {
        self.orientations.len()
    }

    /// The distinct orientations of `object_index` that fit an empty container,
    /// in index order.
    #[inline]
    pub fn orientations(&self, object_index: ObjectIndex) -> &[Orientation] {
        let index = object_index.get();
        debug_assert!(
            index < self.num_objects(),
            "called `PlacementConstraints::orientations` with object index out of bounds: the len is {} but the index is {}",
            self.num_objects(),
            index
        );

        &self.orientations[index]
    }

    /// Returns `true` if the placement lies inside its container.
    #[inline]
    pub fn within_bounds(&self, placement: &Placement<T>) -> bool {
        let zero = T::zero();
        let (l, w, h) = placement.extents().as_tuple();
        let fits = |start: T, len: T, limit: T| {
            start >= zero && start.checked_add(&len).is_some_and(|end| end <= limit)
        };

        fits(placement.x(), l, self.container.length())
            && fits(placement.y(), w, self.container.width())
            && fits(placement.z(), h, self.container.height())
    }

    /// The lowest height of a fitting rotation of an unplaced object other
    /// than `excluded` that could hold up `target` from below.
    pub fn min_cover_height(
        &self,
        model: &Model<T>,
        state: &SearchState<T>,
        target: &Placement<T>,
        excluded: ObjectIndex,
    ) -> Option<T> {
        let footprint = target.extents();
        state
            .unassigned_objects()
            .filter(|&o| o != excluded)
            .flat_map(|o| {
                let base = model.object_extents(o);
                self.orientations(o)
                    .iter()
                    .map(move |&orientation| base.oriented(orientation))
            })
            .filter(|e| {
                e.length() >= footprint.length()
                    && e.width() >= footprint.width()
                    && e.height() <= target.z()
            })
            .map(|e| e.height())
            .min()
    }

    /// Returns `true` if any `blocker` intersects the `depth` thick slab
    /// directly beneath `target`.
    fn slab_blocked<'p, I>(target: &Placement<T>, depth: T, blockers: I) -> bool
    where
        T: 'p,
        I: IntoIterator<Item = &'p Placement<T>>,
    {
        let below = target.cuboid();
        let slab = Cuboid::new(
            below.x(),
            below.y(),
            ClosedOpenInterval::new(target.z() - depth, target.z()),
        );
        blockers
            .into_iter()
            .any(|p| p.container() == target.container() && p.cuboid().intersects(&slab))
    }

    /// Returns `true` if the obligation of the pending `target` can still be
    /// met once `candidate` (if any) is placed as `excluded`.
    fn obligation_open(
        &self,
        model: &Model<T>,
        state: &SearchState<T>,
        target: &Placement<T>,
        excluded: ObjectIndex,
        candidate: Option<&Placement<T>>,
    ) -> bool {
        let Some(depth) = self.min_cover_height(model, state, target, excluded) else {
            return false;
        };

        let placed = state.objects_in(target.container()).map(|(_, p)| p);
        !Self::slab_blocked(target, depth, placed.chain(candidate))
    }

    /// Checks placing `object_index` at `candidate` against the partial
    /// packing in `state`. Returns `None` if any constraint is violated,
    /// including obligations of pending objects that could no longer be met.
    pub fn check(
        &self,
        model: &Model<T>,
        state: &SearchState<T>,
        object_index: ObjectIndex,
        candidate: &Placement<T>,
    ) -> Option<PlacementCheck> {
        debug_assert!(
            !state.is_object_assigned(object_index),
            "called `PlacementConstraints::check` with already assigned object: {}",
            object_index
        );

        if !self.within_bounds(candidate) {
            return None;
        }

        let container = candidate.container();
        if state
            .objects_in(container)
            .any(|(_, placed)| separation(candidate, placed).is_none())
        {
            return None;
        }

        let support = support_of(candidate, state.objects_in(container));
        if support.is_none()
            && !self.obligation_open(model, state, candidate, object_index, None)
        {
            return None;
        }

        for pending in state.pending_objects() {
            let Some(target) = state.placement(pending) else {
                continue;
            };
            if rests_on(target, candidate) {
                continue;
            }
            if !self.obligation_open(model, state, target, object_index, Some(candidate)) {
                return None;
            }
        }

        Some(PlacementCheck { support })
    }

    /// Pending objects whose obligation `candidate` fulfils.
    pub fn discharged_by<'s>(
        &self,
        state: &'s SearchState<T>,
        candidate: &'s Placement<T>,
    ) -> impl Iterator<Item = ObjectIndex> + 's {
        state.pending_objects().filter(move |&pending| {
            state
                .placement(pending)
                .is_some_and(|target| rests_on(target, candidate))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_model::{index::ContainerIndex, model::ModelBuilder};
    use test_case::test_case;

    type IntegerType = i64;

    fn oi(i: usize) -> ObjectIndex {
        ObjectIndex::new(i)
    }

    fn model(
        container: (IntegerType, IntegerType, IntegerType),
        objects: &[(IntegerType, IntegerType, IntegerType)],
    ) -> Model<IntegerType> {
        let mut b = ModelBuilder::new(Extents::new(container.0, container.1, container.2));
        for &(l, w, h) in objects {
            b.add_object(Extents::new(l, w, h));
        }
        b.build()
    }

    fn at(
        container: usize,
        origin: (IntegerType, IntegerType, IntegerType),
        extents: (IntegerType, IntegerType, IntegerType),
    ) -> Placement<IntegerType> {
        Placement::new(
            ContainerIndex::new(container),
            Orientation::Lwh,
            origin,
            Extents::new(extents.0, extents.1, extents.2),
        )
    }

    #[test_case((10, 10, 10), (5, 5, 5), 1; "cube keeps one rotation")]
    #[test_case((10, 10, 10), (1, 2, 3), 6; "distinct sides keep all rotations")]
    #[test_case((10, 10, 10), (2, 2, 3), 3; "two equal sides keep three rotations")]
    #[test_case((4, 4, 2), (4, 4, 1), 1; "flat slab only lies flat")]
    #[test_case((10, 2, 2), (10, 1, 2), 2; "long bar keeps its length axis")]
    fn test_fitting_orientations(
        container: (IntegerType, IntegerType, IntegerType),
        object: (IntegerType, IntegerType, IntegerType),
        expected: usize,
    ) {
        let m = model(container, &[object]);
        let c = PlacementConstraints::build(&m).expect("object fits");
        assert_eq!(c.orientations(oi(0)).len(), expected);
    }

    #[test]
    fn test_invalid_dimensions() {
        let m = model((10, 10, 10), &[(1, 1, 1), (11, 1, 1)]);
        match PlacementConstraints::build(&m) {
            Err(ConstraintError::InvalidDimensions { object, extents }) => {
                assert_eq!(object, oi(1));
                assert_eq!(extents, Extents::new(11, 1, 1));
            }
            other => panic!("expected InvalidDimensions, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_dimensions_display() {
        let e: ConstraintError<IntegerType> = ConstraintError::InvalidDimensions {
            object: oi(3),
            extents: Extents::new(11, 1, 1),
        };
        assert_eq!(
            e.to_string(),
            "ObjectIndex(3) with extents 11x1x1 does not fit the container in any orientation"
        );
    }

    #[test]
    fn test_separation_variants() {
        let a = at(0, (0, 0, 0), (2, 2, 2));
        assert_eq!(
            separation(&a, &at(1, (0, 0, 0), (2, 2, 2))),
            Some(Separation::DifferentContainer)
        );
        assert_eq!(
            separation(&a, &at(0, (2, 0, 0), (2, 2, 2))),
            Some(Separation::Separated {
                axis: Axis::X,
                order: Order::Before
            })
        );
        assert_eq!(
            separation(&a, &at(0, (0, 0, -2), (2, 2, 2))),
            Some(Separation::Separated {
                axis: Axis::Z,
                order: Order::After
            })
        );
        assert_eq!(separation(&a, &at(0, (1, 1, 1), (2, 2, 2))), None);
    }

    #[test]
    fn test_support_of() {
        let floor = at(0, (0, 0, 0), (4, 4, 1));
        let on_top = at(0, (1, 1, 1), (2, 2, 1));
        let overhang = at(0, (3, 3, 1), (2, 2, 1));
        let placed = [(oi(0), &floor)];

        assert_eq!(support_of(&floor, placed), Some(Support::Floor));
        assert_eq!(support_of(&on_top, placed), Some(Support::On(oi(0))));
        assert_eq!(support_of(&overhang, placed), None);
    }

    #[test]
    fn test_check_rejects_overlap_and_bounds() {
        let m = model((4, 4, 4), &[(4, 4, 4), (4, 4, 4)]);
        let c = PlacementConstraints::build(&m).expect("fits");
        let mut s = SearchState::new(2);
        s.assign(oi(0), at(0, (0, 0, 0), (4, 4, 4)), 64, false);

        assert_eq!(c.check(&m, &s, oi(1), &at(0, (0, 0, 0), (4, 4, 4))), None);
        assert_eq!(c.check(&m, &s, oi(1), &at(1, (1, 0, 0), (4, 4, 4))), None);
        assert_eq!(
            c.check(&m, &s, oi(1), &at(1, (0, 0, 0), (4, 4, 4))),
            Some(PlacementCheck {
                support: Some(Support::Floor)
            })
        );
    }

    #[test]
    fn test_check_accepts_deferred_support_when_coverable() {
        // A (1x1x1) may float at z=1 because B (3x1x1) can still go beneath it.
        let m = model((3, 1, 2), &[(1, 1, 1), (3, 1, 1)]);
        let c = PlacementConstraints::build(&m).expect("fits");
        let s = SearchState::new(2);

        let check = c
            .check(&m, &s, oi(0), &at(0, (0, 0, 1), (1, 1, 1)))
            .expect("deferred support is allowed");
        assert!(check.is_pending());
    }

    #[test]
    fn test_check_rejects_deferred_support_without_coverer() {
        // Nothing else is large enough to hold B up.
        let m = model((3, 1, 2), &[(3, 1, 1), (1, 1, 1)]);
        let c = PlacementConstraints::build(&m).expect("fits");
        let s = SearchState::new(2);

        assert_eq!(c.check(&m, &s, oi(0), &at(0, (0, 0, 1), (3, 1, 1))), None);
    }

    #[test]
    fn test_check_protects_pending_slab() {
        // Only object 1 can hold up object 0, and it needs the two units beneath it.
        let m = model((3, 1, 3), &[(1, 1, 1), (3, 1, 2), (1, 1, 1)]);
        let c = PlacementConstraints::build(&m).expect("fits");
        let mut s = SearchState::new(3);
        s.assign(oi(0), at(0, (0, 0, 2), (1, 1, 1)), 1, true);

        assert_eq!(c.check(&m, &s, oi(2), &at(0, (0, 0, 0), (1, 1, 1))), None);
        assert!(c.check(&m, &s, oi(2), &at(0, (2, 0, 0), (1, 1, 1))).is_some());

        let supporter = at(0, (0, 0, 0), (3, 1, 2));
        assert!(c.check(&m, &s, oi(1), &supporter).is_some());
        assert_eq!(c.discharged_by(&s, &supporter).collect::<Vec<_>>(), vec![oi(0)]);
    }

    #[test]
    fn test_check_rejects_taking_the_last_coverer_elsewhere() {
        let m = model((3, 1, 2), &[(1, 1, 1), (3, 1, 1)]);
        let c = PlacementConstraints::build(&m).expect("fits");
        let mut s = SearchState::new(2);
        s.assign(oi(0), at(0, (0, 0, 1), (1, 1, 1)), 1, true);

        // Object 1 is the only coverer; putting it into another container strands object 0.
        assert_eq!(c.check(&m, &s, oi(1), &at(1, (0, 0, 0), (3, 1, 1))), None);
    }
}
