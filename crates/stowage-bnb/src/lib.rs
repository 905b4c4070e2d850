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

//! Stowage-BnB: branch-and-bound for container loading
//!
//! Deterministic branch-and-bound that packs cuboid objects into as few
//! identical containers as possible, with axis-aligned rotations and full
//! area stacking support. Branching, evaluation, monitoring and incumbent
//! handling are separate so strategies can be swapped without touching the
//! search loop.
//!
//! Core flow
//! - Provide a `stowage_model::model::Model<T>`.
//! - Choose a `branching::decision::DecisionBuilder` (which object, which
//!   candidate placements, in what order).
//! - Choose an `eval::evaluator::ObjectiveEvaluator` (objective after a
//!   placement and admissible lower bounds).
//! - Optionally share an incumbent and add monitors.
//! - Run `bnb::BnbSolver` directly, or as a worker through `portfolio`.
//!
//! Design highlights
//! - Constraints are derived once per model (`constraints`) and checked per
//!   candidate; support is an explicit choice between the floor and one
//!   supporter, with pending obligations for supporters placed later.
//! - State is mutated in place and restored via a trail.
//! - Deterministic given deterministic builders and evaluators.
//!
//! Assumptions and guarantees
//! - Objectives never decrease along a branch; pruning relies on this.
//! - Lower bounds must be admissible (no overestimation).
//! - A run that ran out of decisions is a proof only if the builder
//!   reported every expansion as exhaustive; otherwise it ends `Exhausted`.
//!
//! Module map
//! - `bnb`: the solver engine and session orchestration.
//! - `branching`: decision builders.
//! - `constraints`: orientation, bounds, separation and support checks.
//! - `eval`: objective interface and the lexicographic evaluator.
//! - `monitor`: tree search monitors (log, composite, wrapper).
//! - `portfolio`: adapter to the `stowage_search` portfolio API.
//! - `result`: solver outcomes with termination reasons.
//! - `state`: the partial packing explored by the search.
//! - `stats`: counters and timing.

pub mod bnb;
pub mod branching;
pub mod constraints;
pub mod eval;
mod incumbent;
pub mod monitor;
pub mod portfolio;
pub mod result;
mod stack;
pub mod state;
pub mod stats;
mod trail;
