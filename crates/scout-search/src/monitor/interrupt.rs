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
use std::sync::atomic::{AtomicBool, Ordering};

/// A sampling monitor that checks an atomic boolean flag to determine
/// whether the worker should stop.
#[derive(Debug, Clone)]
pub struct InterruptMonitor<'a> {
    stop_flag: &'a AtomicBool,
}

impl<'a> InterruptMonitor<'a> {
    /// Creates a new `InterruptMonitor` that monitors the given atomic boolean flag.
    /// Sampling is terminated once the flag is set to `true`.
    #[inline(always)]
    pub fn new(stop_flag: &'a AtomicBool) -> Self {
        Self { stop_flag }
    }

    #[inline(always)]
    pub fn is_interrupted(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl<'a> SamplingMonitor for InterruptMonitor<'a> {
    fn name(&self) -> &str {
        "InterruptMonitor"
    }

    fn on_enter_sampling(&mut self, _model: &ModelMirror) {}
    fn on_exit_sampling(&mut self) {}
    fn on_sample(&mut self, _score: Option<u64>) {}
    fn on_scenario(&mut self, _instance: &Instance, _score: u64) {}

    fn search_command(&self) -> SearchCommand {
        if self.is_interrupted() {
            SearchCommand::Terminate("Interrupt signal received".to_string())
        } else {
            SearchCommand::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::InterruptMonitor;
    use crate::monitor::sampling_monitor::{SamplingMonitor, SearchCommand};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_interrupt_monitor_continues_when_flag_is_clear() {
        let flag = AtomicBool::new(false);
        let monitor = InterruptMonitor::new(&flag);

        match monitor.search_command() {
            SearchCommand::Continue => {}
            other => panic!("expected Continue, got {:?}", other),
        }
    }

    #[test]
    fn test_interrupt_monitor_terminates_when_flag_is_set() {
        let flag = AtomicBool::new(false);
        let monitor = InterruptMonitor::new(&flag);

        flag.store(true, Ordering::Relaxed);

        match monitor.search_command() {
            SearchCommand::Terminate(reason) => {
                assert_eq!(reason, "Interrupt signal received");
            }
            other => panic!("expected Terminate, got {:?}", other),
        }
    }

    #[test]
    fn test_flag_is_observed_live() {
        let flag = AtomicBool::new(true);
        let monitor = InterruptMonitor::new(&flag);
        assert!(monitor.is_interrupted());

        // Clearing the flag resumes sampling; the monitor keeps no state.
        flag.store(false, Ordering::Relaxed);
        assert!(!monitor.is_interrupted());
        assert!(!monitor.search_command().is_terminate());
    }
}
