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

//! # Sampling Monitors
//!
//! Pluggable observers and controllers for the sampling loop. Monitors can
//! log progress, enforce budgets (samples, wall-clock time) and react to an
//! external interrupt flag by issuing termination commands.
//!
//! ## Submodules
//!
//! - `sampling_monitor`: Core trait (`SamplingMonitor`) and `SearchCommand` enum.
//! - `composite`: Aggregate multiple monitors into a single composite.
//! - `interrupt`: Atomically-driven interrupt monitor for cross-thread stops.
//! - `sample_limit`: Stops the loop after a fixed number of samples.
//! - `time_limit`: Wall-clock time budget monitor with step-filtered checks.
//! - `log`: Periodic progress lines through `tracing`.

pub mod composite;
pub mod interrupt;
pub mod log;
pub mod sample_limit;
pub mod sampling_monitor;
pub mod time_limit;
