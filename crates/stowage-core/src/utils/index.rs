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

//! Phantom-tagged indices.
//!
//! Objects and containers are both addressed by plain positions into the
//! instance. Wrapping those positions in [`TypedIndex<T>`] keeps an object
//! index from being handed to an API that expects a container index, while
//! the `#[repr(transparent)]` layout keeps the wrapper free at runtime.
//!
//! ```rust
//! use stowage_core::utils::index::{TypedIndex, TypedIndexTag};
//!
//! #[derive(Clone, Copy)]
//! struct CrateTag;
//! impl TypedIndexTag for CrateTag { const NAME: &'static str = "CrateIndex"; }
//!
//! let c = TypedIndex::<CrateTag>::new(4);
//! assert_eq!(c.get(), 4);
//! assert_eq!(c.to_string(), "CrateIndex(4)");
//! ```

use std::marker::PhantomData;

/// Names an index domain. The name shows up in `Debug` and `Display` output.
pub trait TypedIndexTag: Clone {
    const NAME: &'static str;
}

/// A `usize` position tagged with its domain `T`.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypedIndex<T> {
    index: usize,
    _tag: PhantomData<T>,
}

impl<T> TypedIndex<T> {
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            _tag: PhantomData,
        }
    }

    /// Returns the raw position.
    #[inline(always)]
    pub const fn get(&self) -> usize {
        self.index
    }

    #[inline(always)]
    pub const fn is_zero(&self) -> bool {
        self.index == 0
    }

    /// Returns the index directly after this one.
    ///
    /// # Panics
    ///
    /// Panics on `usize` overflow in debug builds.
    #[inline(always)]
    pub const fn next(&self) -> Self {
        Self::new(self.index + 1)
    }
}

impl<T: TypedIndexTag> std::fmt::Debug for TypedIndex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T: TypedIndexTag> std::fmt::Display for TypedIndex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T> From<usize> for TypedIndex<T> {
    #[inline(always)]
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

impl<T> From<TypedIndex<T>> for usize {
    #[inline(always)]
    fn from(index: TypedIndex<T>) -> Self {
        index.index
    }
}

impl<T> std::ops::Add<usize> for TypedIndex<T> {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: usize) -> Self::Output {
        Self::new(self.index + rhs)
    }
}

impl<T> std::ops::Sub<usize> for TypedIndex<T> {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: usize) -> Self::Output {
        Self::new(self.index - rhs)
    }
}
