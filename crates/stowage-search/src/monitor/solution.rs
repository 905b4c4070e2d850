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

//! # Solution Count Monitor
//!
//! Counts improving solutions in an `AtomicU64` shared by all workers and,
//! when a limit is configured, stops every worker once the global count
//! reaches it.

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use num_traits::{PrimInt, Signed};
use std::sync::atomic::{AtomicU64, Ordering};
use stowage_model::{model::Model, solution::Solution};

#[derive(Debug)]
pub struct SolutionMonitor<'a, T> {
    solutions_found: &'a AtomicU64,
    solution_limit: Option<u64>,
    _phantom: std::marker::PhantomData<T>,
}

impl<'a, T> SolutionMonitor<'a, T> {
    #[inline]
    pub fn new(solutions_found: &'a AtomicU64, solution_limit: Option<u64>) -> Self {
        Self {
            solutions_found,
            solution_limit,
            _phantom: std::marker::PhantomData,
        }
    }

    #[inline]
    pub fn with_limit(solutions_found: &'a AtomicU64, limit: u64) -> Self {
        Self::new(solutions_found, Some(limit))
    }

    #[inline]
    fn reached_limit(&self) -> bool {
        self.solution_limit
            .is_some_and(|limit| self.solutions_found.load(Ordering::Relaxed) >= limit)
    }
}

impl<'a, T> SearchMonitor<T> for SolutionMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "SolutionMonitor"
    }

    fn on_enter_search(&mut self, _model: &Model<T>) {}
    fn on_exit_search(&mut self) {}

    fn on_solution_found(&mut self, _solution: &Solution<T>) {
        self.solutions_found.fetch_add(1, Ordering::Relaxed);
    }

    fn on_step(&mut self) {}

    fn search_command(&self) -> SearchCommand {
        if self.reached_limit() {
            SearchCommand::Terminate("global solution limit reached".to_string())
        } else {
            SearchCommand::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type IntegerType = i64;

    #[test]
    fn test_without_limit_never_terminates() {
        let count = AtomicU64::new(0);
        let mut m = SolutionMonitor::<IntegerType>::new(&count, None);
        for _ in 0..10 {
            m.on_solution_found(&Solution::new(Vec::new()));
        }
        assert_eq!(count.load(Ordering::Relaxed), 10);
        assert_eq!(m.search_command(), SearchCommand::Continue);
    }

    #[test]
    fn test_limit_is_shared_between_monitors() {
        let count = AtomicU64::new(0);
        let mut a = SolutionMonitor::<IntegerType>::with_limit(&count, 2);
        let mut b = SolutionMonitor::<IntegerType>::with_limit(&count, 2);

        a.on_solution_found(&Solution::new(Vec::new()));
        assert_eq!(b.search_command(), SearchCommand::Continue);
        b.on_solution_found(&Solution::new(Vec::new()));

        let expected = SearchCommand::Terminate("global solution limit reached".into());
        assert_eq!(a.search_command(), expected);
        assert_eq!(b.search_command(), expected);
    }
}
