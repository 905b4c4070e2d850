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

//! Box extents and the six axis-aligned rotations.
//!
//! An object is described by its base extents `(l, w, h)`. Turning it onto
//! another face permutes those extents; every permutation is one of the six
//! [`Orientation`]s below, indexed `0..6` in the order
//! `(l,w,h) (l,h,w) (w,l,h) (w,h,l) (h,l,w) (h,w,l)`.

use num_traits::PrimInt;

/// Lengths of a box along the x, y and z axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extents<T> {
    length: T,
    width: T,
    height: T,
}

impl<T> Extents<T>
where
    T: PrimInt,
{
    #[inline]
    pub const fn new(length: T, width: T, height: T) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    #[inline(always)]
    pub fn length(&self) -> T {
        self.length
    }

    #[inline(always)]
    pub fn width(&self) -> T {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> T {
        self.height
    }

    #[inline(always)]
    pub fn as_tuple(&self) -> (T, T, T) {
        (self.length, self.width, self.height)
    }

    /// Returns `true` if all three extents are strictly positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.length > T::zero() && self.width > T::zero() && self.height > T::zero()
    }

    /// Returns the extents after applying `orientation`.
    ///
    /// ```rust
    /// # use stowage_model::orientation::{Extents, Orientation};
    /// let e = Extents::new(1, 2, 3);
    /// assert_eq!(e.oriented(Orientation::Hwl), Extents::new(3, 2, 1));
    /// ```
    #[inline]
    pub fn oriented(&self, orientation: Orientation) -> Self {
        let (l, w, h) = self.as_tuple();
        match orientation {
            Orientation::Lwh => Self::new(l, w, h),
            Orientation::Lhw => Self::new(l, h, w),
            Orientation::Wlh => Self::new(w, l, h),
            Orientation::Whl => Self::new(w, h, l),
            Orientation::Hlw => Self::new(h, l, w),
            Orientation::Hwl => Self::new(h, w, l),
        }
    }

    /// Returns `true` if a box of these extents fits inside `container`
    /// without turning it.
    #[inline]
    pub fn fits_within(&self, container: &Self) -> bool {
        self.length <= container.length
            && self.width <= container.width
            && self.height <= container.height
    }

    /// Returns `true` if `other` holds the same three values in any order.
    pub fn is_permutation_of(&self, other: &Self) -> bool {
        let mut a = [self.length, self.width, self.height];
        let mut b = [other.length, other.width, other.height];
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }

    /// Returns the volume, widened to `u128`. Saturates instead of overflowing.
    #[inline]
    pub fn volume(&self) -> u128 {
        let side = |v: T| v.to_u128().unwrap_or(0);
        side(self.length)
            .saturating_mul(side(self.width))
            .saturating_mul(side(self.height))
    }
}

impl<T> std::fmt::Display for Extents<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.length, self.width, self.height)
    }
}

/// One of the six axis-aligned rotations of a box.
///
/// The variant name spells which base extent ends up on the x, y and z axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Orientation {
    Lwh,
    Lhw,
    Wlh,
    Whl,
    Hlw,
    Hwl,
}

impl Orientation {
    /// All orientations, in index order.
    pub const ALL: [Orientation; 6] = [
        Orientation::Lwh,
        Orientation::Lhw,
        Orientation::Wlh,
        Orientation::Whl,
        Orientation::Hlw,
        Orientation::Hwl,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the first orientation that turns `base` into `effective`.
    pub fn matching<T>(base: &Extents<T>, effective: &Extents<T>) -> Option<Self>
    where
        T: PrimInt,
    {
        Self::ALL
            .into_iter()
            .find(|&o| base.oriented(o) == *effective)
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Orientation::Lwh => "lwh",
            Orientation::Lhw => "lhw",
            Orientation::Wlh => "wlh",
            Orientation::Whl => "whl",
            Orientation::Hlw => "hlw",
            Orientation::Hwl => "hwl",
        };
        write!(f, "{}({})", name, self.index())
    }
}
