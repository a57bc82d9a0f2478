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

use crate::monitor::sampling_monitor::{SamplingMonitor, SearchCommand};
use scout_model::{instance::Instance, mirror::ModelMirror};

/// A monitor that terminates sampling once a fixed number of candidates has
/// been drawn. Discarded candidates count towards the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLimitMonitor {
    samples: u64,
    sample_limit: u64,
}

impl SampleLimitMonitor {
    #[inline]
    pub fn new(sample_limit: u64) -> Self {
        Self {
            samples: 0,
            sample_limit,
        }
    }

    #[inline]
    pub fn samples(&self) -> u64 {
        self.samples
    }

    #[inline]
    pub fn sample_limit(&self) -> u64 {
        self.sample_limit
    }
}

impl SamplingMonitor for SampleLimitMonitor {
    fn name(&self) -> &str {
        "SampleLimitMonitor"
    }

    fn on_enter_sampling(&mut self, _model: &ModelMirror) {
        self.samples = 0;
    }

    fn on_exit_sampling(&mut self) {}

    #[inline(always)]
    fn on_sample(&mut self, _score: Option<u64>) {
        self.samples = self.samples.saturating_add(1);
    }

    fn on_scenario(&mut self, _instance: &Instance, _score: u64) {}

    fn search_command(&self) -> SearchCommand {
        if self.samples >= self.sample_limit {
            SearchCommand::Terminate("sample limit reached".to_string())
        } else {
            SearchCommand::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continue_before_limit_and_terminate_at_limit() {
        let mut monitor = SampleLimitMonitor::new(3);
        assert!(matches!(monitor.search_command(), SearchCommand::Continue));

        monitor.on_sample(Some(4));
        monitor.on_sample(None);
        assert!(matches!(monitor.search_command(), SearchCommand::Continue));

        monitor.on_sample(Some(0));
        assert_eq!(
            monitor.search_command(),
            SearchCommand::Terminate("sample limit reached".to_string())
        );

        // Further calls still report Terminate
        assert!(monitor.search_command().is_terminate());
    }

    #[test]
    fn test_enter_sampling_resets_counter() {
        let mut monitor = SampleLimitMonitor::new(1);
        monitor.on_sample(Some(1));
        assert!(monitor.search_command().is_terminate());

        monitor.on_enter_sampling(&ModelMirror::new());
        assert_eq!(monitor.samples(), 0);
        assert!(!monitor.search_command().is_terminate());
    }

    #[test]
    fn test_zero_limit_terminates_immediately() {
        let monitor = SampleLimitMonitor::new(0);
        assert!(monitor.search_command().is_terminate());
    }
}
