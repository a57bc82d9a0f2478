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

//! # Time Limit Monitor
//!
//! Enforces a wall-clock budget on the sampling loop. The clock is read only
//! when the sample counter passes a bitmask filter, so the per-sample cost
//! stays at a single increment.
//!
//! ## Highlights
//!
//! - `(samples & clock_check_mask) == 0` triggers a clock check. The default
//!   mask (`0x3FF`) checks roughly every 1,024 samples.
//! - `on_sample()` uses `wrapping_add`.
//! - `search_command()` returns `Terminate("time limit reached")` once the
//!   elapsed time exceeds the limit at a check point.
//!
//! ## Usage
//!
//! ```rust
//! use scout_search::monitor::time_limit::TimeLimitMonitor;
//! use scout_search::monitor::sampling_monitor::{SamplingMonitor, SearchCommand};
//! use std::time::Duration;
//!
//! let mut mon = TimeLimitMonitor::new(Duration::from_secs(5));
//! mon.on_sample(Some(3));
//! match mon.search_command() {
//!     SearchCommand::Continue => { /* keep sampling */ }
//!     SearchCommand::Terminate(reason) => { /* stop: reason */ }
//! }
//! ```

use crate::monitor::sampling_monitor::{SamplingMonitor, SearchCommand};
use scout_model::{instance::Instance, mirror::ModelMirror};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLimitMonitor {
    clock_check_mask: u64,
    samples: u64,
    time_limit: std::time::Duration,
    start_time: std::time::Instant,
}

impl TimeLimitMonitor {
    /// Default mask: check every 1,024 samples (2^10).
    pub const DEFAULT_SAMPLE_CLOCK_CHECK_MASK: u64 = 0x3FF;

    #[inline]
    pub fn new(time_limit: std::time::Duration) -> Self {
        Self::with_clock_check_mask(time_limit, Self::DEFAULT_SAMPLE_CLOCK_CHECK_MASK)
    }

    #[inline]
    pub fn with_clock_check_mask(time_limit: std::time::Duration, clock_check_mask: u64) -> Self {
        Self {
            clock_check_mask,
            samples: 0,
            time_limit,
            start_time: std::time::Instant::now(),
        }
    }

    #[inline]
    pub fn time_limit(&self) -> std::time::Duration {
        self.time_limit
    }
}

impl SamplingMonitor for TimeLimitMonitor {
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_enter_sampling(&mut self, _model: &ModelMirror) {
        self.start_time = std::time::Instant::now();
        self.samples = 0;
    }

    fn on_exit_sampling(&mut self) {}

    #[inline(always)]
    fn on_sample(&mut self, _score: Option<u64>) {
        self.samples = self.samples.wrapping_add(1);
    }

    fn on_scenario(&mut self, _instance: &Instance, _score: u64) {}

    #[inline(always)]
    fn search_command(&self) -> SearchCommand {
        if (self.samples & self.clock_check_mask) == 0
            && self.start_time.elapsed() >= self.time_limit
        {
            return SearchCommand::Terminate("time limit reached".to_string());
        }
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn new_monitor_with_limit(ms: u64) -> TimeLimitMonitor {
        TimeLimitMonitor::new(Duration::from_millis(ms))
    }

    #[test]
    fn test_default_mask_is_power_of_two_minus_one() {
        let mask = TimeLimitMonitor::DEFAULT_SAMPLE_CLOCK_CHECK_MASK;
        assert_eq!(mask, 0x3FF);
        assert!((mask + 1).is_power_of_two());
    }

    #[test]
    fn test_terminates_after_time_limit_when_mask_condition_met() {
        let mut mon = new_monitor_with_limit(10);
        mon.start_time = Instant::now() - Duration::from_millis(50);
        mon.samples = 0;

        match mon.search_command() {
            SearchCommand::Terminate(msg) => {
                assert!(msg.contains("time limit"), "unexpected message: {msg}");
            }
            other => panic!("expected Terminate, got {:?}", other),
        }
    }

    #[test]
    fn test_continues_when_mask_condition_not_met_even_if_time_exceeded() {
        let mut mon = new_monitor_with_limit(1);
        mon.start_time = Instant::now() - Duration::from_millis(50);
        mon.samples = 1;

        assert_eq!(mon.search_command(), SearchCommand::Continue);
    }

    #[test]
    fn test_mask_zero_always_checks() {
        let mut mon = TimeLimitMonitor::with_clock_check_mask(Duration::from_millis(1), 0);
        mon.start_time = Instant::now() - Duration::from_millis(50);
        mon.samples = 12345;

        assert!(mon.search_command().is_terminate());
    }

    #[test]
    fn test_on_sample_wraps() {
        let mut mon = new_monitor_with_limit(1000);
        mon.samples = u64::MAX;
        mon.on_sample(None);
        assert_eq!(mon.samples, 0);
    }

    #[test]
    fn test_enter_sampling_restarts_the_clock() {
        let mut mon = TimeLimitMonitor::with_clock_check_mask(Duration::from_millis(20), 0);
        mon.start_time = Instant::now() - Duration::from_millis(50);
        mon.samples = 7;
        assert!(mon.search_command().is_terminate());

        mon.on_enter_sampling(&ModelMirror::new());
        assert_eq!(mon.samples, 0);
        assert_eq!(mon.search_command(), SearchCommand::Continue);
    }
}
