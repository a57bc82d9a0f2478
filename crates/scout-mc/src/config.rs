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

//! Worker configuration.
//!
//! `WorkerConfig` is assembled through the consuming `WorkerConfigBuilder`.
//! Limits are enforced by sampling monitors, the same way search limits are
//! enforced in a solver portfolio.
//!
//! ```rust
//! use scout_mc::config::{ShutdownDiscipline, WorkerConfigBuilder};
//! use std::time::Duration;
//!
//! let config = WorkerConfigBuilder::new()
//!     .with_discipline(ShutdownDiscipline::Detach)
//!     .with_seed(42)
//!     .with_time_limit(Duration::from_secs(10))
//!     .with_report_threshold(2)
//!     .build();
//!
//! assert_eq!(config.seed(), Some(42));
//! assert_eq!(config.outbound_capacity(), 64);
//! ```

use std::sync::{Arc, atomic::AtomicBool};
use std::time::Duration;

/// What the owner of a worker does on shutdown.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ShutdownDiscipline {
    /// The owner never waits; the worker winds down on its own.
    Detach,
    /// The owner blocks until the worker reached `Stopped`.
    #[default]
    Join,
}

impl std::fmt::Display for ShutdownDiscipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownDiscipline::Detach => write!(f, "detach"),
            ShutdownDiscipline::Join => write!(f, "join"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    discipline: ShutdownDiscipline,
    seed: Option<u64>,
    sample_limit: Option<u64>,
    time_limit: Option<Duration>,
    report_threshold: u64,
    report_improvements: bool,
    outbound_capacity: usize,
    log_interval: Option<Duration>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl Default for WorkerConfig {
    #[inline]
    fn default() -> Self {
        WorkerConfigBuilder::new().build()
    }
}

impl WorkerConfig {
    pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

    #[inline]
    pub fn discipline(&self) -> ShutdownDiscipline {
        self.discipline
    }

    /// The fixed seed, or `None` to draw one from the thread RNG at start.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[inline]
    pub fn sample_limit(&self) -> Option<u64> {
        self.sample_limit
    }

    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Candidates scoring at most this value are reported.
    #[inline]
    pub fn report_threshold(&self) -> u64 {
        self.report_threshold
    }

    /// Whether every strict improvement of the best score is reported as well.
    #[inline]
    pub fn report_improvements(&self) -> bool {
        self.report_improvements
    }

    /// Capacity of the outbound queue, for `scout_search::bridge::channel`.
    #[inline]
    pub fn outbound_capacity(&self) -> usize {
        self.outbound_capacity
    }

    #[inline]
    pub fn log_interval(&self) -> Option<Duration> {
        self.log_interval
    }

    /// An external interrupt flag observed by the worker.
    #[inline]
    pub fn interrupt(&self) -> Option<&Arc<AtomicBool>> {
        self.interrupt.as_ref()
    }
}

impl std::fmt::Display for WorkerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorkerConfig(discipline: {}, seed: {:?}, sample_limit: {:?}, time_limit: {:?}, report_threshold: {}, report_improvements: {})",
            self.discipline,
            self.seed,
            self.sample_limit,
            self.time_limit,
            self.report_threshold,
            self.report_improvements
        )
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfigBuilder {
    discipline: ShutdownDiscipline,
    seed: Option<u64>,
    sample_limit: Option<u64>,
    time_limit: Option<Duration>,
    report_threshold: u64,
    report_improvements: bool,
    outbound_capacity: usize,
    log_interval: Option<Duration>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl Default for WorkerConfigBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerConfigBuilder {
    #[inline]
    pub fn new() -> Self {
        Self {
            discipline: ShutdownDiscipline::default(),
            seed: None,
            sample_limit: None,
            time_limit: None,
            report_threshold: 0,
            report_improvements: false,
            outbound_capacity: WorkerConfig::DEFAULT_OUTBOUND_CAPACITY,
            log_interval: None,
            interrupt: None,
        }
    }

    #[inline]
    pub fn with_discipline(mut self, discipline: ShutdownDiscipline) -> Self {
        self.discipline = discipline;
        self
    }

    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[inline]
    pub fn with_sample_limit(mut self, limit: u64) -> Self {
        self.sample_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_report_threshold(mut self, threshold: u64) -> Self {
        self.report_threshold = threshold;
        self
    }

    #[inline]
    pub fn with_report_improvements(mut self, enabled: bool) -> Self {
        self.report_improvements = enabled;
        self
    }

    #[inline]
    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    #[inline]
    pub fn with_log_interval(mut self, interval: Duration) -> Self {
        self.log_interval = Some(interval);
        self
    }

    #[inline]
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    #[inline]
    pub fn build(self) -> WorkerConfig {
        WorkerConfig {
            discipline: self.discipline,
            seed: self.seed,
            sample_limit: self.sample_limit,
            time_limit: self.time_limit,
            report_threshold: self.report_threshold,
            report_improvements: self.report_improvements,
            outbound_capacity: self.outbound_capacity,
            log_interval: self.log_interval,
            interrupt: self.interrupt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.discipline(), ShutdownDiscipline::Join);
        assert_eq!(config.seed(), None);
        assert_eq!(config.sample_limit(), None);
        assert_eq!(config.time_limit(), None);
        assert_eq!(config.report_threshold(), 0);
        assert!(!config.report_improvements());
        assert_eq!(config.outbound_capacity(), 64);
        assert_eq!(config.log_interval(), None);
        assert!(config.interrupt().is_none());
    }

    #[test]
    fn test_builder_sets_every_field() {
        let flag = Arc::new(AtomicBool::new(false));
        let config = WorkerConfigBuilder::new()
            .with_discipline(ShutdownDiscipline::Detach)
            .with_seed(5)
            .with_sample_limit(1_000)
            .with_time_limit(Duration::from_millis(20))
            .with_report_threshold(3)
            .with_report_improvements(true)
            .with_outbound_capacity(4)
            .with_log_interval(Duration::from_secs(2))
            .with_interrupt(Arc::clone(&flag))
            .build();

        assert_eq!(config.discipline(), ShutdownDiscipline::Detach);
        assert_eq!(config.seed(), Some(5));
        assert_eq!(config.sample_limit(), Some(1_000));
        assert_eq!(config.time_limit(), Some(Duration::from_millis(20)));
        assert_eq!(config.report_threshold(), 3);
        assert!(config.report_improvements());
        assert_eq!(config.outbound_capacity(), 4);
        assert_eq!(config.log_interval(), Some(Duration::from_secs(2)));
        assert!(Arc::ptr_eq(config.interrupt().unwrap(), &flag));
    }

    #[test]
    fn test_display() {
        let config = WorkerConfigBuilder::new().with_seed(1).build();
        assert_eq!(
            config.to_string(),
            "WorkerConfig(discipline: join, seed: Some(1), sample_limit: None, time_limit: None, report_threshold: 0, report_improvements: false)"
        );
    }
}
