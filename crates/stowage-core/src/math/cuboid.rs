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

//! Axis-aligned boxes.
//!
//! A [`Cuboid`] is the product of three [`ClosedOpenInterval`]s, one per axis.
//! The non-overlap and support rules of a packing reduce to interval queries
//! on these projections.

use crate::math::interval::ClosedOpenInterval;
use num_traits::{PrimInt, ToPrimitive};

/// One of the three coordinate axes of a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    /// Along the container length.
    X,
    /// Along the container width.
    Y,
    /// Vertical.
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// An axis-aligned box `[x0, x1) × [y0, y1) × [z0, z1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cuboid<T>
where
    T: PrimInt,
{
    x: ClosedOpenInterval<T>,
    y: ClosedOpenInterval<T>,
    z: ClosedOpenInterval<T>,
}

impl<T> Cuboid<T>
where
    T: PrimInt,
{
    #[inline]
    pub fn new(x: ClosedOpenInterval<T>, y: ClosedOpenInterval<T>, z: ClosedOpenInterval<T>) -> Self {
        Self { x, y, z }
    }

    /// Builds the box with minimum corner `origin` and side lengths `extents`.
    /// Returns `None` if a side is negative or a far face overflows `T`.
    ///
    /// ```rust
    /// # use stowage_core::math::cuboid::Cuboid;
    /// let c = Cuboid::from_origin_and_extents((1, 2, 3), (4, 5, 6)).unwrap();
    /// assert_eq!(c.max_corner(), (5, 7, 9));
    /// ```
    #[inline]
    pub fn from_origin_and_extents(origin: (T, T, T), extents: (T, T, T)) -> Option<Self> {
        Some(Self {
            x: ClosedOpenInterval::from_start_len(origin.0, extents.0)?,
            y: ClosedOpenInterval::from_start_len(origin.1, extents.1)?,
            z: ClosedOpenInterval::from_start_len(origin.2, extents.2)?,
        })
    }

    #[inline(always)]
    pub fn x(&self) -> ClosedOpenInterval<T> {
        self.x
    }

    #[inline(always)]
    pub fn y(&self) -> ClosedOpenInterval<T> {
        self.y
    }

    #[inline(always)]
    pub fn z(&self) -> ClosedOpenInterval<T> {
        self.z
    }

    #[inline]
    pub fn along(&self, axis: Axis) -> ClosedOpenInterval<T> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    #[inline]
    pub fn min_corner(&self) -> (T, T, T) {
        (self.x.start(), self.y.start(), self.z.start())
    }

    #[inline]
    pub fn max_corner(&self) -> (T, T, T) {
        (self.x.end(), self.y.end(), self.z.end())
    }

    /// Returns `true` if the interiors of both boxes share a point.
    /// Boxes that only touch along a face or edge do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x.intersects(&other.x) && self.y.intersects(&other.y) && self.z.intersects(&other.z)
    }

    /// Returns `true` if the horizontal footprint of `other` lies within the
    /// footprint of `self`.
    #[inline]
    pub fn footprint_contains(&self, other: &Self) -> bool {
        self.x.contains_interval(&other.x) && self.y.contains_interval(&other.y)
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.footprint_contains(other) && self.z.contains_interval(&other.z)
    }

    /// Returns the volume, widened to `u128` so that products of large sides
    /// cannot overflow. Returns `None` only if a side does not fit `u128`.
    #[inline]
    pub fn volume(&self) -> Option<u128> {
        let l = self.x.len().to_u128()?;
        let w = self.y.len().to_u128()?;
        let h = self.z.len().to_u128()?;
        l.checked_mul(w)?.checked_mul(h)
    }
}

impl<T> std::fmt::Display for Cuboid<T>
where
    T: PrimInt + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} × {} × {}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type IntegerType = i64;

    fn cube(
        origin: (IntegerType, IntegerType, IntegerType),
        extents: (IntegerType, IntegerType, IntegerType),
    ) -> Cuboid<IntegerType> {
        Cuboid::from_origin_and_extents(origin, extents).expect("valid cuboid")
    }

    #[test]
    fn test_face_contact_is_not_an_intersection() {
        let a = cube((0, 0, 0), (4, 4, 1));
        let b = cube((0, 0, 1), (4, 4, 1));
        assert!(!a.intersects(&b));
        let c = cube((4, 0, 0), (1, 1, 1));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_overlap_requires_all_three_axes() {
        let a = cube((0, 0, 0), (3, 3, 3));
        assert!(a.intersects(&cube((2, 2, 2), (3, 3, 3))));
        assert!(!a.intersects(&cube((2, 2, 3), (3, 3, 3))));
    }

    #[test]
    fn test_footprint_containment() {
        let base = cube((0, 0, 0), (4, 4, 1));
        assert!(base.footprint_contains(&cube((1, 1, 1), (3, 3, 5))));
        assert!(!base.footprint_contains(&cube((1, 1, 1), (4, 3, 5))));
    }

    #[test]
    fn test_containment_and_volume() {
        let container = cube((0, 0, 0), (10, 10, 10));
        assert!(container.contains(&cube((5, 5, 5), (5, 5, 5))));
        assert!(!container.contains(&cube((6, 0, 0), (5, 5, 5))));
        assert_eq!(container.volume(), Some(1000));
    }

    #[test]
    fn test_rejects_overflowing_box() {
        assert!(Cuboid::from_origin_and_extents((IntegerType::MAX, 0, 0), (1, 1, 1)).is_none());
    }

    #[test]
    fn test_along_axis() {
        let c = cube((1, 2, 3), (4, 5, 6));
        assert_eq!(c.along(Axis::Y), ClosedOpenInterval::new(2, 7));
        assert_eq!(Axis::ALL.map(|a| c.along(a).len()), [4, 5, 6]);
        assert_eq!(format!("{}", Axis::Z), "z");
    }
}
