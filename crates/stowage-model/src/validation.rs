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

//! Post-hoc checks of a complete packing.
//!
//! [`validate`] verifies every rule a packing must obey, independently of how
//! it was produced: one placement per object, each a rotation of the object's
//! extents and inside the container, no two boxes of one container
//! overlapping, every box on the floor or fully on top of another box, and
//! container ids without gaps.

use crate::{
    index::{ContainerIndex, ObjectIndex},
    model::Model,
    solution::{Placement, Solution},
};
use num_traits::{PrimInt, Signed};
use rustc_hash::FxHashMap;

/// The first rule a packing was found to break.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    ObjectCountMismatch { expected: usize, found: usize },
    /// The effective extents are no rotation of the base extents.
    OrientationMismatch { object: ObjectIndex },
    /// The box leaves the container or has a negative coordinate.
    OutOfBounds { object: ObjectIndex },
    Overlap { first: ObjectIndex, second: ObjectIndex },
    /// The box floats: not on the floor and not fully on top of another box.
    Unsupported { object: ObjectIndex },
    /// A container id below the largest one is unused.
    NonContiguousContainers { missing: ContainerIndex },
    /// The stored objective differs from the one implied by the placements.
    ObjectiveMismatch,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ObjectCountMismatch { expected, found } => {
                write!(f, "expected {expected} placements, found {found}")
            }
            Self::OrientationMismatch { object } => {
                write!(f, "{object} has extents that are not a rotation of its own")
            }
            Self::OutOfBounds { object } => write!(f, "{object} does not fit its container"),
            Self::Overlap { first, second } => write!(f, "{first} overlaps {second}"),
            Self::Unsupported { object } => {
                write!(f, "{object} neither rests on the floor nor on another object")
            }
            Self::NonContiguousContainers { missing } => {
                write!(f, "{missing} is empty while a later container is used")
            }
            Self::ObjectiveMismatch => write!(f, "objective does not match the placements"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Returns `true` if `top` rests on `bottom`: its floor is exactly at the top
/// face of `bottom` and its footprint lies within the footprint of `bottom`.
#[inline]
pub fn rests_on<T>(top: &Placement<T>, bottom: &Placement<T>) -> bool
where
    T: PrimInt + Signed,
{
    top.container() == bottom.container()
        && top.z() == bottom.top()
        && bottom.cuboid().footprint_contains(&top.cuboid())
}

/// Checks `solution` against `model`.
pub fn validate<T>(model: &Model<T>, solution: &Solution<T>) -> Result<(), ValidationError>
where
    T: PrimInt + Signed,
{
    if solution.num_objects() != model.num_objects() {
        return Err(ValidationError::ObjectCountMismatch {
            expected: model.num_objects(),
            found: solution.num_objects(),
        });
    }

    let container = model.container_extents();
    let mut by_container: FxHashMap<ContainerIndex, Vec<ObjectIndex>> = FxHashMap::default();

    for object in model.object_indices() {
        let p = solution.placement(object);
        let base = model.object_extents(object);
        if base.oriented(p.orientation()) != p.extents() {
            return Err(ValidationError::OrientationMismatch { object });
        }

        let (x1, y1, z1) = p.max_corner();
        let inside = p.x() >= T::zero()
            && p.y() >= T::zero()
            && p.z() >= T::zero()
            && x1 <= container.length()
            && y1 <= container.width()
            && z1 <= container.height();
        if !inside {
            return Err(ValidationError::OutOfBounds { object });
        }

        by_container.entry(p.container()).or_default().push(object);
    }

    let mut groups: Vec<(ContainerIndex, Vec<ObjectIndex>)> = by_container.into_iter().collect();
    groups.sort_unstable_by_key(|(c, _)| *c);

    for (expected, (used, _)) in groups.iter().enumerate() {
        if used.get() != expected {
            return Err(ValidationError::NonContiguousContainers {
                missing: ContainerIndex::new(expected),
            });
        }
    }

    for (_, members) in &groups {
        for (k, &a) in members.iter().enumerate() {
            let pa = solution.placement(a);
            let ca = pa.cuboid();
            for &b in &members[k + 1..] {
                if ca.intersects(&solution.placement(b).cuboid()) {
                    return Err(ValidationError::Overlap {
                        first: a,
                        second: b,
                    });
                }
            }

            let supported = pa.z() == T::zero()
                || members
                    .iter()
                    .any(|&b| b != a && rests_on(pa, solution.placement(b)));
            if !supported {
                return Err(ValidationError::Unsupported { object: a });
            }
        }
    }

    if Solution::new(solution.placements().to_vec()).objective() != solution.objective() {
        return Err(ValidationError::ObjectiveMismatch);
    }

    Ok(())
}

/// Returns `true` if `solution` passes [`validate`].
#[inline]
pub fn is_valid<T>(model: &Model<T>, solution: &Solution<T>) -> bool
where
    T: PrimInt + Signed,
{
    validate(model, solution).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::ModelBuilder,
        objective::Objective,
        orientation::{Extents, Orientation},
    };
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    type IntegerType = i64;

    fn oi(i: usize) -> ObjectIndex {
        ObjectIndex::new(i)
    }

    fn model(container: (IntegerType, IntegerType, IntegerType), objects: &[(IntegerType, IntegerType, IntegerType)]) -> Model<IntegerType> {
        let mut b = ModelBuilder::new(Extents::new(container.0, container.1, container.2));
        for &(l, w, h) in objects {
            b.add_object(Extents::new(l, w, h));
        }
        b.build()
    }

    fn at(
        m: &Model<IntegerType>,
        object: usize,
        container: usize,
        o: Orientation,
        origin: (IntegerType, IntegerType, IntegerType),
    ) -> Placement<IntegerType> {
        Placement::new(ContainerIndex::new(container), o, origin, m.object_extents(oi(object)))
    }

    #[test]
    fn test_stacked_pair_is_valid() {
        let m = model((4, 4, 2), &[(4, 4, 1), (4, 4, 1)]);
        let s = Solution::new(vec![
            at(&m, 0, 0, Orientation::Lwh, (0, 0, 0)),
            at(&m, 1, 0, Orientation::Lwh, (0, 0, 1)),
        ]);
        assert_eq!(validate(&m, &s), Ok(()));
        assert!(is_valid(&m, &s));
        assert_eq!(s.objective(), Objective::new(1, 1));
    }

    #[test]
    fn test_overhang_is_unsupported() {
        let m = model((4, 4, 4), &[(2, 2, 1), (3, 2, 1)]);
        let s = Solution::new(vec![
            at(&m, 0, 0, Orientation::Lwh, (0, 0, 0)),
            at(&m, 1, 0, Orientation::Lwh, (0, 0, 1)),
        ]);
        assert_eq!(validate(&m, &s), Err(ValidationError::Unsupported { object: oi(1) }));
    }

    #[test]
    fn test_support_needs_exact_height() {
        let m = model((4, 4, 4), &[(4, 4, 1), (2, 2, 1)]);
        let s = Solution::new(vec![
            at(&m, 0, 0, Orientation::Lwh, (0, 0, 0)),
            at(&m, 1, 0, Orientation::Lwh, (0, 0, 2)),
        ]);
        assert_eq!(validate(&m, &s), Err(ValidationError::Unsupported { object: oi(1) }));
    }

    #[test]
    fn test_support_from_other_container_does_not_count() {
        let m = model((4, 4, 4), &[(4, 4, 1), (2, 2, 1)]);
        let s = Solution::new(vec![
            at(&m, 0, 0, Orientation::Lwh, (0, 0, 0)),
            at(&m, 1, 1, Orientation::Lwh, (0, 0, 1)),
        ]);
        assert_eq!(validate(&m, &s), Err(ValidationError::Unsupported { object: oi(1) }));
    }

    #[test]
    fn test_overlap_and_bounds() {
        let m = model((4, 4, 4), &[(2, 2, 2), (2, 2, 2)]);
        let s = Solution::new(vec![
            at(&m, 0, 0, Orientation::Lwh, (0, 0, 0)),
            at(&m, 1, 0, Orientation::Lwh, (1, 1, 0)),
        ]);
        assert_eq!(
            validate(&m, &s),
            Err(ValidationError::Overlap { first: oi(0), second: oi(1) })
        );

        let s = Solution::new(vec![
            at(&m, 0, 0, Orientation::Lwh, (0, 0, 0)),
            at(&m, 1, 0, Orientation::Lwh, (3, 0, 0)),
        ]);
        assert_eq!(validate(&m, &s), Err(ValidationError::OutOfBounds { object: oi(1) }));
    }

    #[test]
    fn test_container_gap_is_rejected() {
        let m = model((4, 4, 4), &[(4, 4, 4), (4, 4, 4)]);
        let s = Solution::new(vec![
            at(&m, 0, 0, Orientation::Lwh, (0, 0, 0)),
            at(&m, 1, 2, Orientation::Lwh, (0, 0, 0)),
        ]);
        assert_eq!(
            validate(&m, &s),
            Err(ValidationError::NonContiguousContainers { missing: ContainerIndex::new(1) })
        );
    }

    #[test]
    fn test_foreign_extents_are_rejected() {
        let m = model((4, 4, 4), &[(1, 2, 3)]);
        let s = Solution::new(vec![Placement::new(
            ContainerIndex::new(0),
            Orientation::Lwh,
            (0, 0, 0),
            Extents::new(1, 2, 2),
        )]);
        assert_eq!(validate(&m, &s), Err(ValidationError::OrientationMismatch { object: oi(0) }));

        let short = Solution::new(Vec::new());
        assert_eq!(
            validate(&m, &short),
            Err(ValidationError::ObjectCountMismatch { expected: 1, found: 0 })
        );
    }

    #[test]
    fn test_random_floor_boxes_overlap_iff_cuboids_intersect() {
        let mut rng = SmallRng::seed_from_u64(0x5EED);
        for _ in 0..500 {
            let a = (rng.random_range(1..5), rng.random_range(1..5), rng.random_range(1..5));
            let b = (rng.random_range(1..5), rng.random_range(1..5), rng.random_range(1..5));
            let m = model((10, 10, 10), &[a, b]);
            let o0 = Orientation::from_index(rng.random_range(0..6)).expect("index in range");
            let o1 = Orientation::from_index(rng.random_range(0..6)).expect("index in range");
            let p0 = at(&m, 0, 0, o0, (rng.random_range(0..6), rng.random_range(0..6), 0));
            let p1 = at(&m, 1, 0, o1, (rng.random_range(0..6), rng.random_range(0..6), 0));

            let overlap = p0.cuboid().intersects(&p1.cuboid());
            let s = Solution::new(vec![p0, p1]);
            match validate(&m, &s) {
                Err(ValidationError::Overlap { .. }) => assert!(overlap),
                Ok(()) => assert!(!overlap),
                Err(ValidationError::OutOfBounds { .. }) => {}
                other => panic!("unexpected validation result {:?}", other),
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ValidationError::Overlap { first: oi(0), second: oi(3) }.to_string(),
            "ObjectIndex(0) overlaps ObjectIndex(3)"
        );
    }
}
