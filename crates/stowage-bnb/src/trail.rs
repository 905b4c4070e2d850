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

//! Undo log for the search state.
//!
//! Every change the engine makes to [`SearchState`] below the root goes
//! through the trail. A frame marks the trail length when a node is entered;
//! backtracking replays the entries above that mark in reverse.

use crate::state::SearchState;
use num_traits::{PrimInt, Signed};
use stowage_model::{index::ObjectIndex, solution::Placement};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TrailEntry<T> {
    /// An object was placed; the aggregates hold their values from before.
    Placed {
        object_index: ObjectIndex,
        volume: u128,
        previous_used_containers: usize,
        previous_coordinate_sum: T,
    },
    /// The pending obligation of an object was fulfilled.
    Discharged { object_index: ObjectIndex },
}

impl<T> std::fmt::Display for TrailEntry<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Placed {
                object_index,
                previous_used_containers,
                previous_coordinate_sum,
                ..
            } => write!(
                f,
                "Placed(object: {}, old_used: {}, old_sum: {})",
                object_index, previous_used_containers, previous_coordinate_sum
            ),
            Self::Discharged { object_index } => write!(f, "Discharged(object: {})", object_index),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchTrail<T> {
    entries: Vec<TrailEntry<T>>,
    frames: Vec<usize>,
}

impl<T> Default for SearchTrail<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SearchTrail<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Reserves room for a full dive: one placement and at most one discharge
    /// per object, plus the root frame.
    #[inline]
    pub fn preallocated(num_objects: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_objects.saturating_mul(2)),
            frames: Vec::with_capacity(num_objects.saturating_add(1)),
        }
    }

    #[inline]
    pub fn ensure_capacity(&mut self, num_objects: usize) {
        let entries = num_objects.saturating_mul(2);
        let frames = num_objects.saturating_add(1);
        self.entries
            .reserve(entries.saturating_sub(self.entries.len()));
        self.frames.reserve(frames.saturating_sub(self.frames.len()));
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    #[inline]
    pub fn reset(&mut self) {
        self.entries.clear();
        self.frames.clear();
    }
}

impl<T> SearchTrail<T>
where
    T: PrimInt + Signed,
{
    /// Places `object_index` and records how to undo it.
    #[inline]
    pub fn apply_placement(
        &mut self,
        state: &mut SearchState<T>,
        object_index: ObjectIndex,
        placement: Placement<T>,
        volume: u128,
        pending: bool,
    ) {
        self.entries.push(TrailEntry::Placed {
            object_index,
            volume,
            previous_used_containers: state.used_containers(),
            previous_coordinate_sum: state.coordinate_sum(),
        });
        state.assign(object_index, placement, volume, pending);
    }

    /// Clears the pending flag of `object_index` and records how to undo it.
    #[inline]
    pub fn discharge(&mut self, state: &mut SearchState<T>, object_index: ObjectIndex) {
        self.entries.push(TrailEntry::Discharged { object_index });
        state.set_pending(object_index, false);
    }

    /// Undoes everything since the last frame and drops the frame.
    /// Returns `false` if there was no frame.
    pub fn backtrack(&mut self, state: &mut SearchState<T>) -> bool {
        let Some(start) = self.frames.pop() else {
            return false;
        };

        while self.entries.len() > start {
            match self.entries.pop() {
                Some(TrailEntry::Placed {
                    object_index,
                    volume,
                    previous_used_containers,
                    previous_coordinate_sum,
                }) => state.unassign(
                    object_index,
                    volume,
                    previous_used_containers,
                    previous_coordinate_sum,
                ),
                Some(TrailEntry::Discharged { object_index }) => {
                    state.set_pending(object_index, true)
                }
                None => break,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_model::{
        index::ContainerIndex,
        orientation::{Extents, Orientation},
    };

    type IntegerType = i64;

    fn oi(i: usize) -> ObjectIndex {
        ObjectIndex::new(i)
    }

    fn at(container: usize, z: IntegerType) -> Placement<IntegerType> {
        Placement::new(
            ContainerIndex::new(container),
            Orientation::Lwh,
            (0, 0, z),
            Extents::new(1, 1, 1),
        )
    }

    #[test]
    fn test_backtrack_restores_state() {
        let mut state = SearchState::<IntegerType>::new(3);
        let mut trail = SearchTrail::new();

        trail.push_frame();
        trail.apply_placement(&mut state, oi(0), at(0, 1), 1, true);
        trail.push_frame();
        trail.apply_placement(&mut state, oi(1), at(0, 0), 1, false);
        trail.discharge(&mut state, oi(0));
        trail.apply_placement(&mut state, oi(2), at(1, 0), 1, false);

        assert_eq!(state.num_assigned_objects(), 3);
        assert_eq!(state.used_containers(), 2);
        assert!(!state.has_pending());

        assert!(trail.backtrack(&mut state));
        assert_eq!(state.num_assigned_objects(), 1);
        assert_eq!(state.used_containers(), 1);
        assert_eq!(state.coordinate_sum(), 1);
        assert!(state.is_pending(oi(0)));

        assert!(trail.backtrack(&mut state));
        assert_eq!(state.num_assigned_objects(), 0);
        assert_eq!(state.used_containers(), 0);
        assert!(!trail.backtrack(&mut state));
        assert_eq!(trail.num_entries(), 0);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut trail = SearchTrail::<IntegerType>::preallocated(8);
        let mut state = SearchState::new(8);
        trail.push_frame();
        trail.apply_placement(&mut state, oi(0), at(0, 0), 1, false);
        trail.reset();
        assert_eq!(trail.depth(), 0);
        assert_eq!(trail.num_entries(), 0);
        assert!(trail.entries.capacity() >= 16);
    }

    #[test]
    fn test_display() {
        let e: TrailEntry<IntegerType> = TrailEntry::Discharged { object_index: oi(4) };
        assert_eq!(e.to_string(), "Discharged(object: ObjectIndex(4))");
    }
}
