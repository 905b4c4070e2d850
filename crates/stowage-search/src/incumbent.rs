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

//! # Shared Incumbent
//!
//! The best packing found so far, shared by all search workers.
//!
//! The authoritative [`Solution`] lives behind a `Mutex`. Next to it sit two
//! atomics that workers can poll without locking: the container count of the
//! incumbent, and a generation counter that increases on every install. A
//! worker caches the bound it last read and only takes the lock again when
//! the generation has moved.
//!
//! ```rust
//! use stowage_search::incumbent::SharedIncumbent;
//! use stowage_model::solution::Solution;
//!
//! let inc: SharedIncumbent<i64> = SharedIncumbent::new();
//! assert!(inc.try_install(&Solution::new(Vec::new())));
//! assert_eq!(inc.generation(), 1);
//! ```

use num_traits::{PrimInt, Signed};
use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
};
use stowage_model::{objective::Objective, solution::Solution};

#[derive(Debug)]
pub struct SharedIncumbent<T> {
    containers: AtomicU64,
    generation: AtomicU64,
    solution: Mutex<Option<Solution<T>>>,
}

impl<T> Default for SharedIncumbent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SharedIncumbent<T> {
    #[inline]
    pub fn new() -> Self {
        SharedIncumbent {
            containers: AtomicU64::new(u64::MAX),
            generation: AtomicU64::new(0),
            solution: Mutex::new(None),
        }
    }

    /// Container count of the incumbent, or `None` while there is none.
    #[inline]
    pub fn containers_hint(&self) -> Option<usize> {
        match self.containers.load(Ordering::Acquire) {
            u64::MAX => None,
            c => usize::try_from(c).ok(),
        }
    }

    /// Number of successful installs so far.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, Option<Solution<T>>> {
        // A panicking worker leaves a complete solution behind, so the data is still usable.
        self.solution.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> SharedIncumbent<T>
where
    T: PrimInt + Signed,
{
    /// The objective of the incumbent, if any.
    #[inline]
    pub fn upper_bound(&self) -> Option<Objective<T>> {
        self.lock().as_ref().map(Solution::objective)
    }

    /// A copy of the incumbent, if any.
    #[inline]
    pub fn snapshot(&self) -> Option<Solution<T>> {
        self.lock().clone()
    }

    /// Installs `candidate` if it is strictly better than the incumbent.
    /// Returns `true` on success.
    pub fn try_install(&self, candidate: &Solution<T>) -> bool {
        let objective = candidate.objective();
        if let Some(hint) = self.containers_hint()
            && objective.containers() > hint
        {
            return false;
        }

        let mut guard = self.lock();
        // The hint may be stale; compare against the stored solution.
        if let Some(current) = guard.as_ref()
            && objective >= current.objective()
        {
            return false;
        }

        *guard = Some(candidate.clone());
        self.containers
            .store(objective.containers() as u64, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
        true
    }
}

impl<T> std::fmt::Display for SharedIncumbent<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.upper_bound() {
            Some(objective) => write!(f, "Incumbent(upper_bound: {})", objective),
            None => write!(f, "Incumbent(upper_bound: none)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SharedIncumbent;
    use std::{sync::Arc, thread};
    use stowage_model::{
        index::ContainerIndex,
        objective::Objective,
        orientation::{Extents, Orientation},
        solution::{Placement, Solution},
    };

    type IntegerType = i64;

    /// One unit cube per entry, each in the given container at the given x.
    fn make_solution(cubes: &[(usize, IntegerType)]) -> Solution<IntegerType> {
        Solution::new(
            cubes
                .iter()
                .map(|&(c, x)| {
                    Placement::new(
                        ContainerIndex::new(c),
                        Orientation::Lwh,
                        (x, 0, 0),
                        Extents::new(1, 1, 1),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_initial_state() {
        let inc: SharedIncumbent<IntegerType> = SharedIncumbent::new();
        assert_eq!(inc.upper_bound(), None);
        assert_eq!(inc.containers_hint(), None);
        assert_eq!(inc.generation(), 0);
        assert!(inc.snapshot().is_none());
    }

    #[test]
    fn test_install_better_solution_updates_bound_and_snapshot() {
        let inc: SharedIncumbent<IntegerType> = SharedIncumbent::new();
        let s = make_solution(&[(0, 0), (1, 3)]);

        assert!(inc.try_install(&s));
        assert_eq!(inc.upper_bound(), Some(Objective::new(2, 3)));
        assert_eq!(inc.containers_hint(), Some(2));
        assert_eq!(inc.generation(), 1);
        assert_eq!(inc.snapshot(), Some(s));
    }

    #[test]
    fn test_reject_worse_or_equal_candidates() {
        let inc: SharedIncumbent<IntegerType> = SharedIncumbent::new();
        assert!(inc.try_install(&make_solution(&[(0, 0), (0, 1)])));

        // more containers
        assert!(!inc.try_install(&make_solution(&[(0, 0), (1, 0)])));
        // same containers, larger sum
        assert!(!inc.try_install(&make_solution(&[(0, 0), (0, 2)])));
        // equal
        assert!(!inc.try_install(&make_solution(&[(0, 1), (0, 0)])));

        assert_eq!(inc.upper_bound(), Some(Objective::new(1, 1)));
        assert_eq!(inc.generation(), 1);
    }

    #[test]
    fn test_accepts_smaller_sum_with_same_container_count() {
        let inc: SharedIncumbent<IntegerType> = SharedIncumbent::new();
        assert!(inc.try_install(&make_solution(&[(0, 4)])));
        assert!(inc.try_install(&make_solution(&[(0, 2)])));
        assert_eq!(inc.upper_bound(), Some(Objective::new(1, 2)));
        assert_eq!(inc.generation(), 2);
    }

    #[test]
    fn test_concurrent_installs_minimum_wins() {
        let inc = Arc::new(SharedIncumbent::<IntegerType>::new());
        let offsets: Vec<IntegerType> = vec![30, 20, 40, 5, 12, 7, 50, 6, 9];

        let handles: Vec<_> = offsets
            .iter()
            .map(|&x| {
                let inc = Arc::clone(&inc);
                thread::spawn(move || inc.try_install(&make_solution(&[(0, x)])))
            })
            .collect();

        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.iter().any(|&r| r));

        let best = *offsets.iter().min().unwrap();
        assert_eq!(inc.upper_bound(), Some(Objective::new(1, best)));
        assert_eq!(inc.snapshot().unwrap().placements()[0].x(), best);
    }

    #[test]
    fn test_display() {
        let inc: SharedIncumbent<IntegerType> = SharedIncumbent::new();
        assert_eq!(inc.to_string(), "Incumbent(upper_bound: none)");
        inc.try_install(&make_solution(&[(0, 1)]));
        assert_eq!(
            inc.to_string(),
            "Incumbent(upper_bound: (containers: 1, coordinate sum: 1))"
        );
    }
}
