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

//! # Log Monitor
//!
//! Periodic progress lines for the sampling loop, emitted through `tracing`
//! at `info` level. The clock is only consulted when the sample counter passes
//! the bitmask filter, mirroring `TimeLimitMonitor`.

use crate::monitor::sampling_monitor::{SamplingMonitor, SearchCommand};
use scout_model::{instance::Instance, mirror::ModelMirror};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct LogMonitor {
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    samples: u64,
    faults: u64,
    scenarios: u64,
    best_score: Option<u64>,
}

impl LogMonitor {
    /// Default mask: consider logging every 4,096 samples (2^12).
    pub const DEFAULT_SAMPLE_CLOCK_CHECK_MASK: u64 = 0xFFF;

    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_log_time: now,
            log_interval,
            clock_check_mask,
            samples: 0,
            faults: 0,
            scenarios: 0,
            best_score: None,
        }
    }

    #[inline]
    pub fn best_score(&self) -> Option<u64> {
        self.best_score
    }

    #[inline]
    pub fn samples(&self) -> u64 {
        self.samples
    }

    #[inline(always)]
    fn log_line(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.start_time).as_secs_f32();
        let best = self
            .best_score
            .map_or_else(|| "Inf".to_string(), |s| s.to_string());

        tracing::info!(
            elapsed = format_args!("{:.1}s", elapsed),
            samples = self.samples,
            faults = self.faults,
            best_score = %best,
            scenarios = self.scenarios,
            "sampling progress"
        );

        self.last_log_time = now;
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Self::DEFAULT_SAMPLE_CLOCK_CHECK_MASK)
    }
}

impl std::fmt::Display for LogMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogMonitor(log_interval: {}s, clock_check_mask: {})",
            self.log_interval.as_secs(),
            self.clock_check_mask
        )
    }
}

impl SamplingMonitor for LogMonitor {
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_enter_sampling(&mut self, model: &ModelMirror) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.samples = 0;
        self.faults = 0;
        self.scenarios = 0;
        self.best_score = None;

        tracing::info!(
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            search_space_log10 = format_args!("{:.2}", model.search_space_log10()),
            "sampling started"
        );
    }

    fn on_exit_sampling(&mut self) {
        self.log_line();
        tracing::info!("sampling finished");
    }

    fn on_sample(&mut self, score: Option<u64>) {
        self.samples = self.samples.wrapping_add(1);
        match score {
            Some(score) => {
                if self.best_score.is_none_or(|best| score < best) {
                    self.best_score = Some(score);
                }
            }
            None => self.faults = self.faults.saturating_add(1),
        }

        if (self.samples & self.clock_check_mask) == 0
            && self.last_log_time.elapsed() >= self.log_interval
        {
            self.log_line();
        }
    }

    fn on_scenario(&mut self, _instance: &Instance, _score: u64) {
        self.scenarios = self.scenarios.saturating_add(1);
    }

    fn search_command(&self) -> SearchCommand {
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_best_score_and_counts() {
        let mut monitor = LogMonitor::new(Duration::from_secs(3600), 0);
        monitor.on_enter_sampling(&ModelMirror::new());

        monitor.on_sample(Some(9));
        monitor.on_sample(None);
        monitor.on_sample(Some(3));
        monitor.on_sample(Some(5));
        monitor.on_scenario(&Instance::zeroed(0), 0);

        assert_eq!(monitor.best_score(), Some(3));
        assert_eq!(monitor.samples(), 4);
        assert_eq!(monitor.faults, 1);
        assert_eq!(monitor.scenarios, 1);
        assert_eq!(monitor.search_command(), SearchCommand::Continue);
    }

    #[test]
    fn test_logs_only_when_interval_elapsed() {
        let mut monitor = LogMonitor::new(Duration::from_millis(10), 0);
        let stale = Instant::now() - Duration::from_millis(50);
        monitor.last_log_time = stale;

        monitor.on_sample(Some(1));
        assert!(monitor.last_log_time > stale);
    }

    #[test]
    fn test_display() {
        let monitor = LogMonitor::default();
        assert_eq!(
            monitor.to_string(),
            "LogMonitor(log_interval: 1s, clock_check_mask: 4095)"
        );
    }
}
