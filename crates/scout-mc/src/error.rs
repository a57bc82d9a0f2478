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

use scout_model::{error::ModelError, index::ConstraintIndex};
use scout_search::error::BridgeError;

/// A transient failure while scoring one candidate. The worker discards the
/// candidate and keeps sampling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SamplingFault {
    #[error("arithmetic overflow while evaluating {constraint}")]
    Overflow { constraint: ConstraintIndex },

    #[error("instance has {actual} values but the model has {expected} variables")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("violation score overflowed at {constraint}")]
    ScoreOverflow { constraint: ConstraintIndex },
}

/// Errors surfaced to the owner of an `AsyncWorker`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The worker broke the reporting protocol. Fatal.
    #[error(transparent)]
    ProtocolViolation(#[from] BridgeError),

    #[error("the worker was already started")]
    AlreadyStarted,

    #[error("failed to spawn the worker thread: {0}")]
    Spawn(String),

    #[error("the worker thread panicked: {0}")]
    Panicked(String),
}

impl WorkerError {
    /// Extracts a readable message from a panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        WorkerError::Panicked(message)
    }

    /// Returns `true` if the error means the worker itself failed at runtime.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WorkerError::ProtocolViolation(_) | WorkerError::Panicked(_)
        )
    }
}
