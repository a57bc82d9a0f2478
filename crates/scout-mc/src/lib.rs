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

//! # Scout MC
//!
//! A Monte Carlo companion for an exact quantified constraint search. While
//! the exact search explores its tree, an `AsyncWorker` draws random
//! candidate assignments from the frozen `ModelMirror`, scores them against
//! every constraint and reports the promising ones back through the search
//! bridge.
//!
//! ## Modules
//!
//! - `domains`: per-variable sampling domains and the choice stack fed by the
//!   exact search's branching events.
//! - `sampler`: the `InstanceSampler` trait and the `UniformSampler`.
//! - `scorer`: the `ViolationScorer` trait and the `ConstraintScorer`.
//! - `engine`: the sample, score and report loop.
//! - `stats`, `result`: run statistics and the worker's final outcome.
//! - `config`: `WorkerConfig` and its builder.
//! - `worker`: the `AsyncWorker` background task and its shutdown disciplines.
//! - `error`: `SamplingFault` (absorbed per sample) and `WorkerError` (surfaced
//!   to the host).
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use scout_mc::{config::WorkerConfigBuilder, worker::AsyncWorker};
//! use scout_model::{
//!     constraint::Comparison,
//!     mirror::ModelMirror,
//!     variable::{Quantifier, VarType},
//! };
//! use scout_search::bridge;
//!
//! let mut model = ModelMirror::new();
//! model.register_variable("x", Quantifier::Exists, VarType::Int, 0, 3).unwrap();
//! model.register_variable("y", Quantifier::Forall, VarType::Int, 0, 3).unwrap();
//! model
//!     .register_linear_constraint([(1, "x")], Comparison::Eq, "y")
//!     .unwrap();
//! model.close().unwrap();
//!
//! let (mut search, endpoint) = bridge::channel(16);
//! let config = WorkerConfigBuilder::new().with_seed(7).build();
//! let mut worker = AsyncWorker::new(config);
//! worker.start(Arc::new(model), endpoint).unwrap();
//!
//! let scenario = search.next_scenario().unwrap();
//! assert_eq!(scenario.score(), 0);
//!
//! search.strategy_found();
//! let outcome = worker.await_stopped().unwrap().unwrap();
//! assert!(outcome.statistics().scenarios_emitted >= 1);
//! ```

pub mod config;
pub mod domains;
pub mod engine;
pub mod error;
pub mod result;
pub mod sampler;
pub mod scorer;
pub mod stats;
pub mod worker;
