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

//! Command-line front end for the stowage solver.
//!
//! Reads an instance file, runs the parallel branch-and-bound solver and
//! writes the result file. Around that core it carries the usual binary
//! concerns: argument parsing ([`cli`]), a JSON configuration ([`config`]),
//! logging and file output ([`io`]), an optional JSON run summary
//! ([`summary`]) and an isometric SVG rendering of one container
//! ([`render`]). [`run::run`] ties these together and is what the binary and
//! the integration tests call.

use std::{sync::LazyLock, time::Instant};

pub mod cli;
pub mod config;
pub mod io;
pub mod render;
pub mod run;
pub mod summary;

/// The coordinate type used by the binary.
pub type IntegerType = i64;

/// Reference point for the timestamps in log lines.
pub static EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);
