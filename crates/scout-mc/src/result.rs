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

//! Final outcome of a worker run.
//!
//! `WorkerOutcome` bundles why the worker stopped, its run statistics, the
//! seed it sampled with and the best candidate it has seen, so a host can
//! audit or reproduce a run.

use crate::stats::SamplingStatistics;
use scout_model::instance::Instance;
use scout_search::event::StopReason;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkerTerminationReason {
    /// The exact search proved the problem infeasible.
    GlobalFailure,

    /// The exact search found a winning strategy.
    StrategyFound,

    /// The owner requested a stop.
    StopRequested,

    /// The exact search dropped its side of the bridge.
    SearchDisconnected,

    /// A sampling monitor stopped the loop (sample or time limit, interrupt).
    /// The string carries the monitor's reason.
    Aborted(String),
}

impl WorkerTerminationReason {
    /// Returns `true` if the worker stopped because of a terminal search event.
    #[inline]
    pub fn is_terminal_event(&self) -> bool {
        matches!(
            self,
            WorkerTerminationReason::GlobalFailure | WorkerTerminationReason::StrategyFound
        )
    }
}

impl From<StopReason> for WorkerTerminationReason {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::GlobalFailure => WorkerTerminationReason::GlobalFailure,
            StopReason::StrategyFound => WorkerTerminationReason::StrategyFound,
            StopReason::StopRequested => WorkerTerminationReason::StopRequested,
            StopReason::SearchDisconnected => WorkerTerminationReason::SearchDisconnected,
        }
    }
}

impl std::fmt::Display for WorkerTerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerTerminationReason::GlobalFailure => write!(f, "Global Failure"),
            WorkerTerminationReason::StrategyFound => write!(f, "Strategy Found"),
            WorkerTerminationReason::StopRequested => write!(f, "Stop Requested"),
            WorkerTerminationReason::SearchDisconnected => write!(f, "Search Disconnected"),
            WorkerTerminationReason::Aborted(msg) => write!(f, "Aborted: {}", msg),
        }
    }
}

/// Result of a worker after it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerOutcome {
    termination_reason: WorkerTerminationReason,
    best: Option<(Instance, u64)>,
    seed: Option<u64>,
    statistics: SamplingStatistics,
}

impl WorkerOutcome {
    #[inline]
    pub fn new(
        termination_reason: WorkerTerminationReason,
        best: Option<(Instance, u64)>,
        statistics: SamplingStatistics,
    ) -> Self {
        Self {
            termination_reason,
            best,
            seed: None,
            statistics,
        }
    }

    /// Records the seed the run was sampled with.
    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[inline]
    pub fn termination_reason(&self) -> &WorkerTerminationReason {
        &self.termination_reason
    }

    /// The candidate with the lowest score seen during the run, if any was scored.
    #[inline]
    pub fn best_instance(&self) -> Option<&Instance> {
        self.best.as_ref().map(|(instance, _)| instance)
    }

    #[inline]
    pub fn best_score(&self) -> Option<u64> {
        self.best.as_ref().map(|(_, score)| *score)
    }

    /// The seed of the worker's random source, if recorded.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[inline]
    pub fn statistics(&self) -> &SamplingStatistics {
        &self.statistics
    }
}

impl std::fmt::Display for WorkerOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Termination: {}", self.termination_reason)?;
        if let Some(seed) = self.seed {
            writeln!(f, "Seed: {}", seed)?;
        }
        match &self.best {
            Some((instance, score)) => writeln!(f, "Best: {} (score {})", instance, score)?,
            None => writeln!(f, "Best: none")?,
        }
        write!(f, "{}", self.statistics)
    }
}
