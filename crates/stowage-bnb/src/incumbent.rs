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

//! Incumbent access for branch-and-bound.
//!
//! `IncumbentStore<T>` is the engine's view of the best known objective. It
//! hides whether the search runs alone or next to other workers.
//!
//! Implementations
//! - `NoSharedIncumbent<T>`: local only. There is no initial bound, `tighten`
//!   passes the local bound through and publishing is a no-op.
//! - `SharedIncumbentAdapter<'a, T>`: wraps
//!   `stowage_search::incumbent::SharedIncumbent<T>`. The shared bound is only
//!   re-read after the incumbent's generation counter moved, so polling it on
//!   every step stays lock free.

use num_traits::{PrimInt, Signed};
use std::marker::PhantomData;
use stowage_model::{objective::Objective, solution::Solution};
use stowage_search::incumbent::SharedIncumbent;

/// The better of two optional bounds, where `None` means unbounded.
#[inline(always)]
pub fn tighter<T>(a: Option<Objective<T>>, b: Option<Objective<T>>) -> Option<Objective<T>>
where
    T: PrimInt + Signed,
{
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

pub trait IncumbentStore<T>
where
    T: PrimInt + Signed,
{
    fn initial_upper_bound(&mut self) -> Option<Objective<T>>;
    fn tighten(&mut self, current_local_best: Option<Objective<T>>) -> Option<Objective<T>>;
    fn on_solution_found(&mut self, solution: &Solution<T>);
    /// The best solution known to the store, if it keeps one.
    fn snapshot(&self) -> Option<Solution<T>>;
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy)]
pub struct NoSharedIncumbent<T>(PhantomData<T>);

impl<T> Default for NoSharedIncumbent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NoSharedIncumbent<T> {
    #[inline(always)]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> IncumbentStore<T> for NoSharedIncumbent<T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    fn initial_upper_bound(&mut self) -> Option<Objective<T>> {
        None
    }

    #[inline(always)]
    fn tighten(&mut self, current_local_best: Option<Objective<T>>) -> Option<Objective<T>> {
        current_local_best
    }

    #[inline(always)]
    fn on_solution_found(&mut self, _: &Solution<T>) {}

    #[inline(always)]
    fn snapshot(&self) -> Option<Solution<T>> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct SharedIncumbentAdapter<'a, T> {
    inner: &'a SharedIncumbent<T>,
    seen_generation: u64,
    cached_bound: Option<Objective<T>>,
}

impl<'a, T> SharedIncumbentAdapter<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    pub fn new(inner: &'a SharedIncumbent<T>) -> Self {
        Self {
            inner,
            seen_generation: inner.generation(),
            cached_bound: inner.upper_bound(),
        }
    }

    #[inline(always)]
    fn refresh(&mut self) {
        let generation = self.inner.generation();
        if generation != self.seen_generation {
            self.seen_generation = generation;
            self.cached_bound = self.inner.upper_bound();
        }
    }
}

impl<'a, T> IncumbentStore<T> for SharedIncumbentAdapter<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    fn initial_upper_bound(&mut self) -> Option<Objective<T>> {
        self.refresh();
        self.cached_bound
    }

    #[inline(always)]
    fn tighten(&mut self, current_local_best: Option<Objective<T>>) -> Option<Objective<T>> {
        self.refresh();
        tighter(self.cached_bound, current_local_best)
    }

    #[inline(always)]
    fn on_solution_found(&mut self, solution: &Solution<T>) {
        self.inner.try_install(solution);
    }

    #[inline]
    fn snapshot(&self) -> Option<Solution<T>> {
        self.inner.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_model::{
        index::ContainerIndex,
        orientation::{Extents, Orientation},
        solution::Placement,
    };

    type IntegerType = i64;

    fn solution(container: usize, x: IntegerType) -> Solution<IntegerType> {
        Solution::new(vec![Placement::new(
            ContainerIndex::new(container),
            Orientation::Lwh,
            (x, 0, 0),
            Extents::new(1, 1, 1),
        )])
    }

    #[test]
    fn test_tighter() {
        let a = Some(Objective::<IntegerType>::new(1, 5));
        let b = Some(Objective::new(2, 0));
        assert_eq!(tighter(a, b), a);
        assert_eq!(tighter(None, b), b);
        assert_eq!(tighter(a, None), a);
        assert_eq!(tighter::<IntegerType>(None, None), None);
    }

    #[test]
    fn test_no_shared_incumbent_is_passthrough() {
        let mut store = NoSharedIncumbent::<IntegerType>::new();
        assert_eq!(store.initial_upper_bound(), None);
        let local = Some(Objective::new(3, 7));
        assert_eq!(store.tighten(local), local);
        store.on_solution_found(&solution(0, 0));
        assert_eq!(store.snapshot(), None);
    }

    #[test]
    fn test_adapter_reads_shared_bound() {
        let shared = SharedIncumbent::<IntegerType>::new();
        let mut adapter = SharedIncumbentAdapter::new(&shared);
        assert_eq!(adapter.initial_upper_bound(), None);

        assert!(shared.try_install(&solution(1, 4)));
        assert_eq!(adapter.initial_upper_bound(), Some(Objective::new(2, 4)));

        // A better local bound wins, a worse one is replaced by the shared bound.
        assert_eq!(
            adapter.tighten(Some(Objective::new(1, 9))),
            Some(Objective::new(1, 9))
        );
        assert_eq!(
            adapter.tighten(Some(Objective::new(3, 0))),
            Some(Objective::new(2, 4))
        );
    }

    #[test]
    fn test_adapter_publishes_solutions() {
        let shared = SharedIncumbent::<IntegerType>::new();
        let mut adapter = SharedIncumbentAdapter::new(&shared);

        adapter.on_solution_found(&solution(0, 2));
        assert_eq!(shared.upper_bound(), Some(Objective::new(1, 2)));
        assert_eq!(adapter.tighten(None), Some(Objective::new(1, 2)));

        let snap = adapter.snapshot().expect("snapshot present");
        assert_eq!(snap.num_objects(), 1);
        assert_eq!(snap.objective(), Objective::new(1, 2));
    }
}
