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

use crate::{index::ObjectIndex, orientation::Extents};
use num_traits::{PrimInt, Signed};

/// An immutable container loading instance.
///
/// Holds the extents shared by every container and the base extents of each
/// object in input order. Object data is kept in flat vectors indexed by
/// [`ObjectIndex`], next to precomputed volumes used by the lower bounds.
#[derive(Clone, Debug)]
pub struct Model<T>
where
    T: PrimInt + Signed,
{
    container: Extents<T>,
    container_volume: u128,
    object_extents: Vec<Extents<T>>, // len = num_objects
    object_volumes: Vec<u128>,       // len = num_objects
    total_object_volume: u128,
}

impl<T> Model<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn num_objects(&self) -> usize {
        self.object_extents.len()
    }

    #[inline]
    pub fn container_extents(&self) -> Extents<T> {
        self.container
    }

    #[inline]
    pub fn container_volume(&self) -> u128 {
        self.container_volume
    }

    #[inline]
    pub fn objects(&self) -> &[Extents<T>] {
        &self.object_extents
    }

    #[inline]
    pub fn object_extents(&self, object_index: ObjectIndex) -> Extents<T> {
        let index = object_index.get();
        debug_assert!(
            index < self.num_objects(),
            "called `Model::object_extents` with object index out of bounds: the len is {} but the index is {}",
            self.num_objects(),
            index
        );

        self.object_extents[index]
    }

    #[inline]
    pub fn object_volume(&self, object_index: ObjectIndex) -> u128 {
        let index = object_index.get();
        debug_assert!(
            index < self.num_objects(),
            "called `Model::object_volume` with object index out of bounds: the len is {} but the index is {}",
            self.num_objects(),
            index
        );

        self.object_volumes[index]
    }

    #[inline]
    pub fn total_object_volume(&self) -> u128 {
        self.total_object_volume
    }

    /// The number of containers the objects need by volume alone,
    /// `ceil(total object volume / container volume)`.
    pub fn min_containers_by_volume(&self) -> usize {
        if self.container_volume == 0 {
            return 0;
        }
        let needed = self.total_object_volume.div_ceil(self.container_volume);
        usize::try_from(needed).unwrap_or(usize::MAX)
    }

    /// An upper bound on `Σx + Σy + Σz` over any packing of this instance,
    /// or `None` if that bound does not fit `T`.
    ///
    /// Every coordinate of an object is at most the container extent along
    /// that axis minus the smallest extent of the object.
    pub fn max_coordinate_sum(&self) -> Option<T> {
        let (cl, cw, ch) = self.container.as_tuple();
        self.object_extents.iter().try_fold(T::zero(), |acc, e| {
            let (l, w, h) = e.as_tuple();
            let shortest = l.min(w).min(h);
            let reach = |c: T| (c - shortest).max(T::zero());
            acc.checked_add(&reach(cl))?
                .checked_add(&reach(cw))?
                .checked_add(&reach(ch))
        })
    }

    /// Returns an iterator over all object indices in input order.
    #[inline]
    pub fn object_indices(&self) -> impl Iterator<Item = ObjectIndex> + use<T> {
        (0..self.num_objects()).map(ObjectIndex::new)
    }
}

impl<T> std::fmt::Display for Model<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Model(container: {}, objects: {})",
            self.container,
            self.num_objects()
        )
    }
}

/// Collects a container and its objects, then freezes them into a [`Model`].
#[derive(Clone, Debug)]
pub struct ModelBuilder<T>
where
    T: PrimInt + Signed,
{
    container: Extents<T>,
    object_extents: Vec<Extents<T>>,
}

impl<T> ModelBuilder<T>
where
    T: PrimInt + Signed,
{
    /// Starts a model for containers of the given extents.
    ///
    /// # Panics
    ///
    /// Panics if an extent is not strictly positive.
    pub fn new(container: Extents<T>) -> Self {
        assert!(
            container.is_positive(),
            "called `ModelBuilder::new` with non-positive container extents"
        );

        Self {
            container,
            object_extents: Vec::new(),
        }
    }

    /// Reserves room for `additional` more objects.
    #[inline]
    pub fn with_capacity(container: Extents<T>, additional: usize) -> Self {
        let mut builder = Self::new(container);
        builder.object_extents.reserve(additional);
        builder
    }

    /// Appends an object and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if an extent is not strictly positive.
    pub fn add_object(&mut self, extents: Extents<T>) -> ObjectIndex {
        assert!(
            extents.is_positive(),
            "called `ModelBuilder::add_object` with non-positive object extents"
        );

        let index = ObjectIndex::new(self.object_extents.len());
        self.object_extents.push(extents);
        index
    }

    #[inline]
    pub fn num_objects(&self) -> usize {
        self.object_extents.len()
    }

    pub fn build(self) -> Model<T> {
        let object_volumes: Vec<u128> = self.object_extents.iter().map(Extents::volume).collect();
        let total_object_volume = object_volumes
            .iter()
            .fold(0u128, |acc, v| acc.saturating_add(*v));

        Model {
            container: self.container,
            container_volume: self.container.volume(),
            object_extents: self.object_extents,
            object_volumes,
            total_object_volume,
        }
    }
}
