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

//! The ranking key of a packing.
//!
//! Packings are ranked first by the number of containers they use and then
//! by the sum of all placement coordinates. [`Objective`] stores both terms
//! and compares them lexicographically, so no weighting constant is needed.
//! [`Objective::legacy_scalar`] still produces the single weighted number
//! `weight * (containers - 1) + Σx + Σy + Σz` for reporting.

use crate::model::Model;
use num_traits::{NumCast, PrimInt, Signed};

/// Number of containers used, then the sum of all placement coordinates.
///
/// The derived ordering compares `containers` first, which makes smaller
/// values better in both terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Objective<T> {
    containers: usize,
    coordinate_sum: T,
}

impl<T> Objective<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub const fn new(containers: usize, coordinate_sum: T) -> Self {
        Self {
            containers,
            coordinate_sum,
        }
    }

    /// The objective of an empty packing.
    #[inline]
    pub fn zero() -> Self {
        Self::new(0, T::zero())
    }

    #[inline(always)]
    pub fn containers(&self) -> usize {
        self.containers
    }

    #[inline(always)]
    pub fn coordinate_sum(&self) -> T {
        self.coordinate_sum
    }

    /// Adds both terms, saturating at the numeric bounds.
    #[inline]
    pub fn saturating_add(&self, other: &Self) -> Self {
        Self::new(
            self.containers.saturating_add(other.containers),
            self.coordinate_sum.saturating_add(other.coordinate_sum),
        )
    }

    /// Returns `weight * (containers - 1) + coordinate_sum`, the single number
    /// the weighted formulation minimizes, or `None` on overflow.
    ///
    /// An empty packing maps to its coordinate sum.
    ///
    /// ```rust
    /// # use stowage_model::objective::Objective;
    /// let o = Objective::<i64>::new(2, 17);
    /// assert_eq!(o.legacy_scalar(10_000), Some(10_017));
    /// ```
    pub fn legacy_scalar(&self, weight: T) -> Option<T> {
        let max_id = <T as NumCast>::from(self.containers.saturating_sub(1))?;
        weight.checked_mul(&max_id)?.checked_add(&self.coordinate_sum)
    }

    /// Returns `true` if ranking by [`Objective::legacy_scalar`] with `weight`
    /// agrees with the lexicographic order for every packing of `model`.
    ///
    /// This holds when the largest possible coordinate sum stays below `weight`.
    pub fn weight_preserves_order(model: &Model<T>, weight: T) -> bool {
        model
            .max_coordinate_sum()
            .is_some_and(|bound| bound < weight)
    }
}

impl<T> std::fmt::Display for Objective<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(containers: {}, coordinate sum: {})",
            self.containers, self.coordinate_sum
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::ModelBuilder, orientation::Extents};

    type IntegerType = i64;

    fn obj(c: usize, s: IntegerType) -> Objective<IntegerType> {
        Objective::new(c, s)
    }

    #[test]
    fn test_containers_dominate_coordinate_sum() {
        assert!(obj(1, 1_000_000) < obj(2, 0));
        assert!(obj(2, 3) < obj(2, 4));
        assert_eq!(obj(2, 3).max(obj(1, 99)), obj(2, 3));
    }

    #[test]
    fn test_saturating_add() {
        assert_eq!(obj(1, 5).saturating_add(&obj(2, 7)), obj(3, 12));
        assert_eq!(
            obj(usize::MAX, IntegerType::MAX).saturating_add(&obj(1, 1)),
            obj(usize::MAX, IntegerType::MAX)
        );
    }

    #[test]
    fn test_legacy_scalar() {
        assert_eq!(obj(1, 0).legacy_scalar(10_000), Some(0));
        assert_eq!(obj(3, 42).legacy_scalar(10_000), Some(20_042));
        assert_eq!(obj(0, 0).legacy_scalar(10_000), Some(0));
        assert_eq!(obj(3, 0).legacy_scalar(IntegerType::MAX), None);
    }

    #[test]
    fn test_weight_preserves_order() {
        let mut b = ModelBuilder::<IntegerType>::new(Extents::new(4000, 4000, 4000));
        b.add_object(Extents::new(1, 1, 1));
        let m = b.build();
        // bound is 3 * 3999
        assert!(!Objective::weight_preserves_order(&m, 10_000));
        assert!(Objective::weight_preserves_order(&m, 12_000));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{}", obj(2, 10)),
            "(containers: 2, coordinate sum: 10)"
        );
    }
}
