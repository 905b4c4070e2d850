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

//! # Stowage Model
//!
//! The domain model of the container loading problem: identical containers,
//! boxes that may be turned onto any face, and packings that keep every box
//! inside its container, clear of the others and fully supported.
//!
//! ## Modules
//!
//! * **`index`**: typed `ObjectIndex` and `ContainerIndex`.
//! * **`orientation`**: `Extents` and the six rotations.
//! * **`model`**: the immutable `Model` and its `ModelBuilder`.
//! * **`loading`**: the text instance loader.
//! * **`objective`**: the lexicographic `(containers, coordinate sum)` key.
//! * **`solution`**: `Placement` and `Solution`.
//! * **`report`**: reading and writing `SAT`/`UNSAT` result files.
//! * **`validation`**: post-hoc checks of a packing.

pub mod index;
pub mod loading;
pub mod model;
pub mod objective;
pub mod orientation;
pub mod report;
pub mod solution;
pub mod validation;
