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

//! Search state for the container loading solver.
//!
//! `SearchState` is the mutable partial packing the branch-and-bound engine
//! works on. It is changed in place by the trail when descending and restored
//! by the trail on backtrack, so it never has to be cloned in the hot loop.
//!
//! Tracked per object:
//! - whether it is placed (`FixedBitSet`) and, if so, its `Placement`,
//! - whether it is a pending support obligation: placed above the floor
//!   without a placed supporter, waiting for a later object to go beneath it.
//!
//! Tracked globally:
//! - the number of objects in every container and the number of containers
//!   in use (always a prefix `0..used` of the container ids),
//! - the coordinate sum and the volume of everything placed so far.

use fixedbitset::FixedBitSet;
use num_traits::{PrimInt, Signed};
use stowage_model::{
    index::{ContainerIndex, ObjectIndex},
    objective::Objective,
    solution::{Placement, Solution},
};

#[derive(Debug, Clone)]
pub struct SearchState<T> {
    placements: Vec<Option<Placement<T>>>,
    container_loads: Vec<usize>,
    assigned: FixedBitSet,
    pending: FixedBitSet,
    coordinate_sum: T,
    placed_volume: u128,
    used_containers: usize,
    num_assigned_objects: usize,
}

impl<T> SearchState<T>
where
    T: PrimInt + Signed,
{
    /// Creates an empty state for `num_objects` objects. At most one
    /// container per object can ever be opened.
    #[inline]
    pub fn new(num_objects: usize) -> Self {
        Self {
            placements: vec![None; num_objects],
            container_loads: vec![0; num_objects],
            assigned: FixedBitSet::with_capacity(num_objects),
            pending: FixedBitSet::with_capacity(num_objects),
            coordinate_sum: T::zero(),
            placed_volume: 0,
            used_containers: 0,
            num_assigned_objects: 0,
        }
    }

    #[inline]
    pub fn num_objects(&self) -> usize {
        self.placements.len()
    }

    #[inline]
    pub fn num_assigned_objects(&self) -> usize {
        self.num_assigned_objects
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.num_assigned_objects == self.num_objects()
    }

    /// Number of containers holding at least one object.
    #[inline]
    pub fn used_containers(&self) -> usize {
        self.used_containers
    }

    /// `Σx + Σy + Σz` over the placed objects.
    #[inline]
    pub fn coordinate_sum(&self) -> T {
        self.coordinate_sum
    }

    #[inline]
    pub fn placed_volume(&self) -> u128 {
        self.placed_volume
    }

    /// The objective of the partial packing. Placing more objects never
    /// decreases it.
    #[inline]
    pub fn current_objective(&self) -> Objective<T> {
        Objective::new(self.used_containers, self.coordinate_sum)
    }

    #[inline]
    pub fn is_object_assigned(&self, object_index: ObjectIndex) -> bool {
        let index = object_index.get();
        debug_assert!(
            index < self.num_objects(),
            "called `SearchState::is_object_assigned` with object index out of bounds: the len is {} but the index is {}",
            self.num_objects(),
            index
        );

        self.assigned.contains(index)
    }

    /// Returns `true` if the object is placed above the floor and still waits
    /// for a supporter.
    #[inline]
    pub fn is_pending(&self, object_index: ObjectIndex) -> bool {
        let index = object_index.get();
        debug_assert!(
            index < self.num_objects(),
            "called `SearchState::is_pending` with object index out of bounds: the len is {} but the index is {}",
            self.num_objects(),
            index
        );

        self.pending.contains(index)
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_clear()
    }

    #[inline]
    pub fn placement(&self, object_index: ObjectIndex) -> Option<&Placement<T>> {
        let index = object_index.get();
        debug_assert!(
            index < self.num_objects(),
            "called `SearchState::placement` with object index out of bounds: the len is {} but the index is {}",
            self.num_objects(),
            index
        );

        self.placements[index].as_ref()
    }

    #[inline]
    pub fn container_load(&self, container_index: ContainerIndex) -> usize {
        let index = container_index.get();
        debug_assert!(
            index < self.container_loads.len(),
            "called `SearchState::container_load` with container index out of bounds: the len is {} but the index is {}",
            self.container_loads.len(),
            index
        );

        self.container_loads[index]
    }

    /// The first object in input order that is not placed yet.
    #[inline]
    pub fn first_unassigned(&self) -> Option<ObjectIndex> {
        self.assigned.zeroes().next().map(ObjectIndex::new)
    }

    #[inline]
    pub fn unassigned_objects(&self) -> impl Iterator<Item = ObjectIndex> + '_ {
        self.assigned.zeroes().map(ObjectIndex::new)
    }

    #[inline]
    pub fn pending_objects(&self) -> impl Iterator<Item = ObjectIndex> + '_ {
        self.pending.ones().map(ObjectIndex::new)
    }

    /// Placed objects of `container_index`, in input order.
    #[inline]
    pub fn objects_in(
        &self,
        container_index: ContainerIndex,
    ) -> impl Iterator<Item = (ObjectIndex, &Placement<T>)> + '_ {
        self.assigned.ones().filter_map(move |i| {
            self.placements[i]
                .as_ref()
                .filter(|p| p.container() == container_index)
                .map(|p| (ObjectIndex::new(i), p))
        })
    }

    /// Places an object. The trail is responsible for undoing this.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the object is already placed or the
    /// container would leave a gap in the used container ids.
    pub fn assign(
        &mut self,
        object_index: ObjectIndex,
        placement: Placement<T>,
        volume: u128,
        pending: bool,
    ) {
        let index = object_index.get();
        debug_assert!(
            index < self.num_objects(),
            "called `SearchState::assign` with object index out of bounds: the len is {} but the index is {}",
            self.num_objects(),
            index
        );
        debug_assert!(
            !self.assigned.contains(index),
            "called `SearchState::assign` with already assigned object: {}",
            object_index
        );
        let container = placement.container().get();
        debug_assert!(
            container <= self.used_containers,
            "called `SearchState::assign` with non-contiguous container: {} while {} are in use",
            placement.container(),
            self.used_containers
        );

        self.assigned.insert(index);
        self.pending.set(index, pending);
        self.placements[index] = Some(placement);
        self.container_loads[container] += 1;
        self.used_containers = self.used_containers.max(container + 1);
        self.coordinate_sum = self.coordinate_sum.saturating_add(placement.coordinate_sum());
        self.placed_volume = self.placed_volume.saturating_add(volume);
        self.num_assigned_objects += 1;
    }

    /// Removes a placed object and restores the scalar aggregates recorded
    /// before it was placed.
    pub fn unassign(
        &mut self,
        object_index: ObjectIndex,
        volume: u128,
        previous_used_containers: usize,
        previous_coordinate_sum: T,
    ) {
        let index = object_index.get();
        debug_assert!(
            self.assigned.contains(index),
            "called `SearchState::unassign` with unassigned object: {}",
            object_index
        );

        if let Some(placement) = self.placements[index].take() {
            self.container_loads[placement.container().get()] -= 1;
        }
        self.assigned.set(index, false);
        self.pending.set(index, false);
        self.used_containers = previous_used_containers;
        self.coordinate_sum = previous_coordinate_sum;
        self.placed_volume = self.placed_volume.saturating_sub(volume);
        self.num_assigned_objects -= 1;
    }

    #[inline]
    pub fn set_pending(&mut self, object_index: ObjectIndex, pending: bool) {
        debug_assert!(
            self.assigned.contains(object_index.get()),
            "called `SearchState::set_pending` with unassigned object: {}",
            object_index
        );
        self.pending.set(object_index.get(), pending);
    }

    pub fn reset(&mut self) {
        self.placements.iter_mut().for_each(|p| *p = None);
        self.container_loads.iter_mut().for_each(|c| *c = 0);
        self.assigned.clear();
        self.pending.clear();
        self.coordinate_sum = T::zero();
        self.placed_volume = 0;
        self.used_containers = 0;
        self.num_assigned_objects = 0;
    }
}

impl<T> std::fmt::Display for SearchState<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "State(objective: {}, assigned_objects: {}/{}, pending: {})",
            self.current_objective(),
            self.num_assigned_objects,
            self.num_objects(),
            self.pending.count_ones(..)
        )
    }
}

/// Returned when a state that is not a complete, fully supported packing is
/// turned into a [`Solution`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IncompleteSolutionError {
    Unassigned { assigned: usize, total: usize },
    PendingSupport { object: ObjectIndex },
}

impl std::fmt::Display for IncompleteSolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unassigned { assigned, total } => {
                write!(f, "Incomplete solution: assigned {}/{} objects", assigned, total)
            }
            Self::PendingSupport { object } => {
                write!(f, "Incomplete solution: {} has no supporter", object)
            }
        }
    }
}

impl std::error::Error for IncompleteSolutionError {}

impl<T> TryFrom<&SearchState<T>> for Solution<T>
where
    T: PrimInt + Signed,
{
    type Error = IncompleteSolutionError;

    fn try_from(state: &SearchState<T>) -> Result<Self, Self::Error> {
        if let Some(object) = state.pending_objects().next() {
            return Err(IncompleteSolutionError::PendingSupport { object });
        }

        let placements: Option<Vec<Placement<T>>> = state.placements.iter().copied().collect();
        match placements {
            Some(placements) => Ok(Solution::new(placements)),
            None => Err(IncompleteSolutionError::Unassigned {
                assigned: state.num_assigned_objects,
                total: state.num_objects(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_model::orientation::{Extents, Orientation};

    type IntegerType = i64;

    fn oi(i: usize) -> ObjectIndex {
        ObjectIndex::new(i)
    }

    fn ci(i: usize) -> ContainerIndex {
        ContainerIndex::new(i)
    }

    fn cube(container: usize, origin: (IntegerType, IntegerType, IntegerType)) -> Placement<IntegerType> {
        Placement::new(ci(container), Orientation::Lwh, origin, Extents::new(2, 2, 2))
    }

    #[test]
    fn test_new_state_is_empty() {
        let s = SearchState::<IntegerType>::new(3);
        assert_eq!(s.num_objects(), 3);
        assert_eq!(s.num_assigned_objects(), 0);
        assert_eq!(s.used_containers(), 0);
        assert_eq!(s.current_objective(), Objective::zero());
        assert_eq!(s.first_unassigned(), Some(oi(0)));
        assert!(!s.has_pending());
        assert!(!s.is_complete());
    }

    #[test]
    fn test_assign_updates_aggregates() {
        let mut s = SearchState::<IntegerType>::new(3);
        s.assign(oi(0), cube(0, (0, 0, 0)), 8, false);
        s.assign(oi(1), cube(0, (2, 0, 0)), 8, false);
        s.assign(oi(2), cube(1, (0, 1, 0)), 8, false);

        assert_eq!(s.used_containers(), 2);
        assert_eq!(s.coordinate_sum(), 3);
        assert_eq!(s.placed_volume(), 24);
        assert_eq!(s.container_load(ci(0)), 2);
        assert_eq!(s.container_load(ci(1)), 1);
        assert_eq!(s.first_unassigned(), None);
        assert!(s.is_complete());

        let in_first: Vec<ObjectIndex> = s.objects_in(ci(0)).map(|(o, _)| o).collect();
        assert_eq!(in_first, vec![oi(0), oi(1)]);
    }

    #[test]
    fn test_unassign_restores_previous_values() {
        let mut s = SearchState::<IntegerType>::new(2);
        s.assign(oi(0), cube(0, (0, 0, 0)), 8, false);
        let (used, sum) = (s.used_containers(), s.coordinate_sum());

        s.assign(oi(1), cube(1, (1, 1, 1)), 8, true);
        assert!(s.is_pending(oi(1)));

        s.unassign(oi(1), 8, used, sum);
        assert!(!s.is_object_assigned(oi(1)));
        assert!(!s.is_pending(oi(1)));
        assert_eq!(s.used_containers(), 1);
        assert_eq!(s.coordinate_sum(), 0);
        assert_eq!(s.placed_volume(), 8);
        assert_eq!(s.container_load(ci(1)), 0);
    }

    #[test]
    fn test_pending_blocks_conversion() {
        let mut s = SearchState::<IntegerType>::new(1);
        s.assign(oi(0), cube(0, (0, 0, 2)), 8, true);
        let err = Solution::try_from(&s).unwrap_err();
        assert_eq!(err, IncompleteSolutionError::PendingSupport { object: oi(0) });

        s.set_pending(oi(0), false);
        let solution = Solution::try_from(&s).expect("complete state converts");
        assert_eq!(solution.objective(), Objective::new(1, 2));
    }

    #[test]
    fn test_incomplete_conversion_reports_counts() {
        let mut s = SearchState::<IntegerType>::new(2);
        s.assign(oi(0), cube(0, (0, 0, 0)), 8, false);
        match Solution::try_from(&s) {
            Err(IncompleteSolutionError::Unassigned { assigned, total }) => {
                assert_eq!((assigned, total), (1, 2));
            }
            other => panic!("expected Unassigned, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut s = SearchState::<IntegerType>::new(2);
        s.assign(oi(0), cube(0, (0, 0, 1)), 8, true);
        s.reset();
        assert_eq!(s.num_assigned_objects(), 0);
        assert!(!s.has_pending());
        assert_eq!(s.placement(oi(0)), None);
        assert_eq!(s.container_load(ci(0)), 0);
    }

    #[test]
    fn test_display() {
        let mut s = SearchState::<IntegerType>::new(2);
        s.assign(oi(0), cube(0, (1, 0, 0)), 8, false);
        assert_eq!(
            s.to_string(),
            "State(objective: (containers: 1, coordinate sum: 1), assigned_objects: 1/2, pending: 0)"
        );
    }
}
