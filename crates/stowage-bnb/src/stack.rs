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

//! Explicit decision stack for depth-first search.
//!
//! Open decisions of all nodes on the current path live in one flat vector;
//! `frames` stores where each node's decisions begin. The top of the stack
//! is explored first.

use crate::branching::decision::Decision;

#[derive(Clone, Debug)]
pub struct SearchStack<T> {
    entries: Vec<Decision<T>>,
    frames: Vec<usize>,
}

impl<T> Default for SearchStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SearchStack<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            frames: Vec::new(),
        }
    }

    #[inline]
    pub fn preallocated(num_objects: usize) -> Self {
        let mut stack = Self::new();
        stack.ensure_capacity(num_objects);
        stack
    }

    /// Reserves room for one frame per object plus a modest number of open
    /// decisions per frame.
    #[inline]
    pub fn ensure_capacity(&mut self, num_objects: usize) {
        let entry_capacity = num_objects.saturating_mul(16);
        let frame_capacity = num_objects.saturating_add(1);
        self.entries
            .reserve(entry_capacity.saturating_sub(self.entries.len()));
        self.frames
            .reserve(frame_capacity.saturating_sub(self.frames.len()));
    }

    #[inline]
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    /// Drops the top frame together with its open decisions.
    #[inline]
    pub fn pop_frame(&mut self) -> Option<()> {
        let start = self.frames.pop()?;
        self.entries.truncate(start);
        Some(())
    }

    #[inline]
    pub fn push(&mut self, decision: Decision<T>) {
        self.entries.push(decision);
    }

    /// Pushes `decisions` so that the first one yielded is popped first.
    /// Returns how many were pushed.
    #[inline]
    pub fn extend_best_first<I>(&mut self, decisions: I) -> usize
    where
        I: IntoIterator<Item = Decision<T>>,
    {
        let start = self.entries.len();
        self.entries.extend(decisions);
        self.entries[start..].reverse();
        self.entries.len() - start
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Decision<T>> {
        let start = self.frames.last().copied().unwrap_or(0);
        if self.entries.len() > start {
            self.entries.pop()
        } else {
            None
        }
    }

    #[inline]
    pub fn is_current_level_empty(&self) -> bool {
        let start = self.frames.last().copied().unwrap_or(0);
        self.entries.len() <= start
    }

    /// The open decisions of the top frame, last to be explored first.
    #[inline]
    pub fn current_frame_entries(&self) -> &[Decision<T>] {
        let start = self.frames.last().copied().unwrap_or(0);
        &self.entries[start..]
    }

    #[inline]
    pub fn reset(&mut self) {
        self.entries.clear();
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_model::{
        index::{ContainerIndex, ObjectIndex},
        objective::Objective,
        orientation::{Extents, Orientation},
        solution::Placement,
    };

    type IntegerType = i64;

    fn decision(object: usize, x: IntegerType) -> Decision<IntegerType> {
        let placement = Placement::new(
            ContainerIndex::new(0),
            Orientation::Lwh,
            (x, 0, 0),
            Extents::new(1, 1, 1),
        );
        Decision::new(ObjectIndex::new(object), placement, Objective::new(1, x), false)
    }

    #[test]
    fn test_best_first_order() {
        let mut s = SearchStack::new();
        s.push_frame();
        let pushed = s.extend_best_first([decision(0, 0), decision(0, 1), decision(0, 2)]);
        assert_eq!(pushed, 3);
        assert_eq!(s.pop(), Some(decision(0, 0)));
        assert_eq!(s.pop(), Some(decision(0, 1)));
        assert_eq!(s.current_frame_entries(), &[decision(0, 2)]);
    }

    #[test]
    fn test_frames_isolate_levels() {
        let mut s = SearchStack::new();
        s.push_frame();
        s.push(decision(0, 0));
        s.push_frame();
        assert!(s.is_current_level_empty());
        assert_eq!(s.pop(), None);
        s.push(decision(1, 3));
        assert_eq!(s.depth(), 2);

        assert_eq!(s.pop_frame(), Some(()));
        assert_eq!(s.num_entries(), 1);
        assert!(!s.is_current_level_empty());
        assert_eq!(s.pop(), Some(decision(0, 0)));
    }

    #[test]
    fn test_pop_frame_discards_open_decisions() {
        let mut s = SearchStack::new();
        s.push_frame();
        s.push_frame();
        s.extend_best_first([decision(1, 0), decision(1, 1)]);
        s.pop_frame();
        assert_eq!(s.num_entries(), 0);
        assert_eq!(s.depth(), 1);
        s.reset();
        assert_eq!(s.depth(), 0);
        assert_eq!(s.pop_frame(), None);
    }
}
