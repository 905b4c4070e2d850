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

use num_traits::PrimInt;

/// A half-open interval `[start, end)` over a primitive integer type.
///
/// Placed boxes project onto each axis as one of these. Two boxes that only
/// touch along a face share an endpoint but do not intersect, which is what
/// makes `x_i + l_i <= x_j` the separation test.
///
/// # Invariants
///
/// `start <= end` always holds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClosedOpenInterval<T>
where
    T: PrimInt,
{
    start_inclusive: T,
    end_exclusive: T,
}

impl<T> ClosedOpenInterval<T>
where
    T: PrimInt,
{
    /// Creates a new interval.
    ///
    /// # Panics
    ///
    /// Panics if `start_inclusive > end_exclusive`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use stowage_core::math::interval::ClosedOpenInterval;
    /// let iv = ClosedOpenInterval::new(2, 7);
    /// assert_eq!(iv.len(), 5);
    /// ```
    #[inline]
    pub fn new(start_inclusive: T, end_exclusive: T) -> Self {
        assert!(
            start_inclusive <= end_exclusive,
            "invalid interval: start_inclusive must be less than or equal to end_exclusive"
        );
        Self {
            start_inclusive,
            end_exclusive,
        }
    }

    /// Creates a new interval, returning `None` when the bounds are reversed.
    #[inline]
    pub fn try_new(start_inclusive: T, end_exclusive: T) -> Option<Self> {
        (start_inclusive <= end_exclusive).then_some(Self {
            start_inclusive,
            end_exclusive,
        })
    }

    /// Creates `[start, start + len)`, returning `None` on overflow or negative length.
    #[inline]
    pub fn from_start_len(start: T, len: T) -> Option<Self> {
        let end = start.checked_add(&len)?;
        Self::try_new(start, end)
    }

    #[inline(always)]
    pub fn start(&self) -> T {
        self.start_inclusive
    }

    #[inline(always)]
    pub fn end(&self) -> T {
        self.end_exclusive
    }

    #[inline(always)]
    pub fn len(&self) -> T {
        self.end_exclusive - self.start_inclusive
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.start_inclusive == self.end_exclusive
    }

    /// Returns `true` if `point` lies inside `[start, end)`.
    #[inline]
    pub fn contains(&self, point: T) -> bool {
        self.start_inclusive <= point && point < self.end_exclusive
    }

    /// Returns `true` if `other` lies entirely within `self`.
    ///
    /// ```rust
    /// # use stowage_core::math::interval::ClosedOpenInterval;
    /// let outer = ClosedOpenInterval::new(0, 10);
    /// assert!(outer.contains_interval(&ClosedOpenInterval::new(0, 10)));
    /// assert!(!outer.contains_interval(&ClosedOpenInterval::new(5, 11)));
    /// ```
    #[inline]
    pub fn contains_interval(&self, other: &Self) -> bool {
        self.start_inclusive <= other.start_inclusive && other.end_exclusive <= self.end_exclusive
    }

    /// Returns `true` if the intervals share at least one point.
    /// Empty intervals intersect nothing.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.start_inclusive < other.end_exclusive
            && other.start_inclusive < self.end_exclusive
            && !self.is_empty()
            && !other.is_empty()
    }

    /// Returns the overlapping part of both intervals, if any.
    #[inline]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start_inclusive.max(other.start_inclusive);
        let end = self.end_exclusive.min(other.end_exclusive);
        (start < end).then_some(Self {
            start_inclusive: start,
            end_exclusive: end,
        })
    }
}

impl<T> std::fmt::Debug for ClosedOpenInterval<T>
where
    T: PrimInt + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}, {:?})", self.start_inclusive, self.end_exclusive)
    }
}

impl<T> std::fmt::Display for ClosedOpenInterval<T>
where
    T: PrimInt + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start_inclusive, self.end_exclusive)
    }
}

impl<T> From<ClosedOpenInterval<T>> for std::ops::Range<T>
where
    T: PrimInt,
{
    #[inline]
    fn from(iv: ClosedOpenInterval<T>) -> Self {
        iv.start_inclusive..iv.end_exclusive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    type IntegerType = i64;

    fn iv(a: IntegerType, b: IntegerType) -> ClosedOpenInterval<IntegerType> {
        ClosedOpenInterval::new(a, b)
    }

    #[test]
    #[should_panic(expected = "invalid interval")]
    fn test_new_rejects_reversed_bounds() {
        let _ = iv(5, 4);
    }

    #[test]
    fn test_try_new_and_from_start_len() {
        assert!(ClosedOpenInterval::<IntegerType>::try_new(3, 2).is_none());
        assert_eq!(ClosedOpenInterval::from_start_len(4, 3), Some(iv(4, 7)));
        assert!(ClosedOpenInterval::<IntegerType>::from_start_len(IntegerType::MAX, 1).is_none());
        assert!(ClosedOpenInterval::<IntegerType>::from_start_len(2, -1).is_none());
    }

    #[test_case(iv(0, 4), iv(4, 8), false; "touching faces do not intersect")]
    #[test_case(iv(0, 4), iv(3, 8), true; "one unit overlap")]
    #[test_case(iv(2, 3), iv(0, 10), true; "nested")]
    #[test_case(iv(5, 5), iv(0, 10), false; "empty never intersects")]
    #[test_case(iv(6, 9), iv(0, 2), false; "disjoint")]
    fn test_intersects(a: ClosedOpenInterval<IntegerType>, b: ClosedOpenInterval<IntegerType>, expected: bool) {
        assert_eq!(a.intersects(&b), expected);
        assert_eq!(b.intersects(&a), expected);
    }

    #[test]
    fn test_intersection() {
        assert_eq!(iv(0, 5).intersection(&iv(3, 9)), Some(iv(3, 5)));
        assert_eq!(iv(0, 5).intersection(&iv(5, 9)), None);
    }

    #[test]
    fn test_containment() {
        let outer = iv(1, 6);
        assert!(outer.contains(1));
        assert!(outer.contains(5));
        assert!(!outer.contains(6));
        assert!(outer.contains_interval(&iv(2, 6)));
        assert!(!outer.contains_interval(&iv(0, 3)));
    }

    #[test]
    fn test_display_and_range_conversion() {
        assert_eq!(format!("{}", iv(1, 3)), "[1, 3)");
        assert_eq!(format!("{:?}", iv(1, 3)), "[1, 3)");
        let r: std::ops::Range<IntegerType> = iv(1, 3).into();
        assert_eq!(r.collect::<Vec<_>>(), vec![1, 2]);
    }
}
