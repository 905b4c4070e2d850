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

use crate::{
    index::{ContainerIndex, ObjectIndex},
    objective::Objective,
    orientation::{Extents, Orientation},
};
use num_traits::{PrimInt, Signed};
use stowage_core::math::{cuboid::Cuboid, interval::ClosedOpenInterval};

/// Where and how one object sits: the container, the minimum corner, the
/// chosen rotation and the effective extents under that rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement<T> {
    container: ContainerIndex,
    orientation: Orientation,
    x: T,
    y: T,
    z: T,
    extents: Extents<T>,
}

impl<T> Placement<T>
where
    T: PrimInt + Signed,
{
    /// Places an object with base extents `base` at `(x, y, z)` in `container`,
    /// turned by `orientation`.
    #[inline]
    pub fn new(
        container: ContainerIndex,
        orientation: Orientation,
        (x, y, z): (T, T, T),
        base: Extents<T>,
    ) -> Self {
        Self {
            container,
            orientation,
            x,
            y,
            z,
            extents: base.oriented(orientation),
        }
    }

    #[inline(always)]
    pub fn container(&self) -> ContainerIndex {
        self.container
    }

    #[inline(always)]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[inline(always)]
    pub fn x(&self) -> T {
        self.x
    }

    #[inline(always)]
    pub fn y(&self) -> T {
        self.y
    }

    #[inline(always)]
    pub fn z(&self) -> T {
        self.z
    }

    #[inline(always)]
    pub fn origin(&self) -> (T, T, T) {
        (self.x, self.y, self.z)
    }

    /// The extents after applying the orientation.
    #[inline(always)]
    pub fn extents(&self) -> Extents<T> {
        self.extents
    }

    /// The maximum corner, `origin + extents`. Saturates at `T::max_value()`.
    #[inline]
    pub fn max_corner(&self) -> (T, T, T) {
        (
            self.x.saturating_add(self.extents.length()),
            self.y.saturating_add(self.extents.width()),
            self.z.saturating_add(self.extents.height()),
        )
    }

    /// The top face height, `z + height`.
    #[inline]
    pub fn top(&self) -> T {
        self.z.saturating_add(self.extents.height())
    }

    /// `x + y + z`.
    #[inline]
    pub fn coordinate_sum(&self) -> T {
        self.x.saturating_add(self.y).saturating_add(self.z)
    }

    /// The occupied box. Empty or negative boxes collapse to empty intervals.
    pub fn cuboid(&self) -> Cuboid<T> {
        let (x1, y1, z1) = self.max_corner();
        let span = |a: T, b: T| ClosedOpenInterval::new(a.min(b), b);
        Cuboid::new(span(self.x, x1), span(self.y, y1), span(self.z, z1))
    }
}

/// A complete packing: one [`Placement`] per object, in input order, and the
/// [`Objective`] it achieves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution<T> {
    objective: Objective<T>,
    placements: Vec<Placement<T>>,
}

impl<T> Solution<T>
where
    T: PrimInt + Signed,
{
    /// Wraps `placements` and computes the objective: one more than the
    /// largest container id used, then the summed coordinates.
    pub fn new(placements: Vec<Placement<T>>) -> Self {
        let containers = placements
            .iter()
            .map(|p| p.container.get() + 1)
            .max()
            .unwrap_or(0);
        let coordinate_sum = placements
            .iter()
            .fold(T::zero(), |acc, p| acc.saturating_add(p.coordinate_sum()));

        Self {
            objective: Objective::new(containers, coordinate_sum),
            placements,
        }
    }

    #[inline]
    pub fn objective(&self) -> Objective<T> {
        self.objective
    }

    #[inline]
    pub fn num_objects(&self) -> usize {
        self.placements.len()
    }

    #[inline]
    pub fn num_containers(&self) -> usize {
        self.objective.containers()
    }

    #[inline]
    pub fn placements(&self) -> &[Placement<T>] {
        &self.placements
    }

    #[inline]
    pub fn placement(&self, object_index: ObjectIndex) -> &Placement<T> {
        let index = object_index.get();
        debug_assert!(
            index < self.num_objects(),
            "called `Solution::placement` with object index out of bounds: the len is {} but the index is {}",
            self.num_objects(),
            index
        );

        &self.placements[index]
    }

    /// Returns the objects assigned to `container`, in input order.
    pub fn objects_in(
        &self,
        container: ContainerIndex,
    ) -> impl Iterator<Item = (ObjectIndex, &Placement<T>)> + '_ {
        self.placements
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.container == container)
            .map(|(i, p)| (ObjectIndex::new(i), p))
    }
}

impl<T> std::fmt::Display for Solution<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution Summary")?;
        writeln!(f, "   Containers:     {}", self.objective.containers())?;
        writeln!(f, "   Coordinate Sum: {}", self.objective.coordinate_sum())?;
        writeln!(f)?;

        if self.placements.is_empty() {
            writeln!(f, "   (No objects placed)")?;
            return Ok(());
        }

        writeln!(
            f,
            "   {:<8} | {:<9} | {:<16} | {:<12}",
            "Object", "Container", "Origin", "Orientation"
        )?;
        writeln!(f, "   {:-<8}-+-{:-<9}-+-{:-<16}-+-{:-<12}", "", "", "", "")?;
        for (i, p) in self.placements.iter().enumerate() {
            let origin = format!("({}, {}, {})", p.x, p.y, p.z);
            writeln!(
                f,
                "   {:<8} | {:<9} | {:<16} | {:<12}",
                i,
                p.container.get(),
                origin,
                p.orientation.to_string()
            )?;
        }

        Ok(())
    }
}
