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

//! # Scout Search
//!
//! The seam between the sampling worker and the exact quantified search.
//!
//! ## Modules
//!
//! - `event`: the closed set of inbound `SearchEvent`s emitted by the exact
//!   search and the outbound `PromisingScenario` reports.
//! - `bridge`: the typed two-way channel. `SearchHandle` lives with the exact
//!   search, `WorkerEndpoint` with the worker; `StopHandle`/`StopListener`
//!   carry owner-initiated cancellation.
//! - `monitor`: sampling monitors observing the worker loop and deciding when
//!   it must terminate (interrupt flag, sample limit, time limit, logging).
//! - `error`: `BridgeError`, raised when the reporting protocol is broken.
//!
//! ## Protocol
//!
//! Inbound events are delivered in the order the exact search produced them.
//! `GlobalFailure` and `StrategyFound` are terminal: the endpoint observes at
//! most one of them, never reads past it, and refuses every report afterwards.

pub mod bridge;
pub mod error;
pub mod event;
pub mod monitor;
