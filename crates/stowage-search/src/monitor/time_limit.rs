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

//! # Time Limit Monitor
//!
//! Enforces a wall-clock budget. The clock is read every `stride + 1` steps,
//! where the stride adapts to how expensive a step is: it starts at zero,
//! doubles while two reads are less than [`MIN_CHECK_INTERVAL`] apart and
//! halves once they are more than [`MAX_CHECK_INTERVAL`] apart. The clock
//! check mask caps the stride; with a mask of zero every step reads the
//! clock.

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use num_traits::{PrimInt, Signed};
use std::time::{Duration, Instant};
use stowage_model::model::Model;

pub const MIN_CHECK_INTERVAL: Duration = Duration::from_micros(500);
pub const MAX_CHECK_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLimitMonitor<T> {
    clock_check_mask: u64,
    stride: u64,
    steps: u64,
    expired: bool,
    time_limit: Duration,
    start_time: Instant,
    last_check: Instant,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> TimeLimitMonitor<T> {
    /// Caps the stride at 1024 steps.
    pub const DEFAULT_CLOCK_CHECK_MASK: u64 = 0x3FF;

    #[inline]
    pub fn new(time_limit: Duration) -> Self {
        Self::with_clock_check_mask(time_limit, Self::DEFAULT_CLOCK_CHECK_MASK)
    }

    /// `clock_check_mask` should be of the form `2^k - 1`.
    #[inline]
    pub fn with_clock_check_mask(time_limit: Duration, clock_check_mask: u64) -> Self {
        let now = Instant::now();
        Self {
            clock_check_mask,
            stride: 0,
            steps: 0,
            expired: false,
            time_limit,
            start_time: now,
            last_check: now,
            _phantom: std::marker::PhantomData,
        }
    }

    #[inline]
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    fn read_clock(&mut self) {
        let now = Instant::now();
        self.expired = now.duration_since(self.start_time) >= self.time_limit;

        let interval = now.duration_since(self.last_check);
        if interval < MIN_CHECK_INTERVAL {
            self.stride = ((self.stride << 1) | 1).min(self.clock_check_mask);
        } else if interval > MAX_CHECK_INTERVAL {
            self.stride >>= 1;
        }
        self.last_check = now;
    }
}

impl<T> SearchMonitor<T> for TimeLimitMonitor<T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_enter_search(&mut self, _model: &Model<T>) {
        self.start_time = Instant::now();
        self.last_check = self.start_time;
        self.steps = 0;
        self.stride = 0;
        self.expired = false;
    }

    #[inline(always)]
    fn on_step(&mut self) {
        self.steps = self.steps.wrapping_add(1);
        if (self.steps & self.stride) == 0 {
            self.read_clock();
        }
    }

    #[inline(always)]
    fn search_command(&self) -> SearchCommand {
        if self.expired {
            return SearchCommand::Terminate("time limit reached".to_string());
        }
        SearchCommand::Continue
    }
}
