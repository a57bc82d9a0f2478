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

//! Statistics of a sampling run.
//!
//! Counters are updated from the hot loop with saturating arithmetic and are
//! reported in the worker's final `WorkerOutcome`.

use scout_search::event::SearchEvent;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SamplingStatistics {
    /// Number of candidates drawn, discarded ones included.
    pub samples: u64,

    /// Number of candidates discarded because of a sampling fault.
    pub faults: u64,

    /// Number of scenarios handed to the exact search.
    pub scenarios_emitted: u64,

    /// Number of `ChoiceMade` events observed.
    pub choices: u64,

    /// Number of `FailureAtNode` events observed.
    pub failures: u64,

    /// Number of `ScenarioShared` events observed.
    pub shared_scenarios: u64,

    /// Lowest violation score seen so far.
    pub best_score: Option<u64>,

    /// Total time spent in the sampling loop.
    pub time_total: Duration,
}

impl SamplingStatistics {
    #[inline]
    pub fn on_sample(&mut self) {
        self.samples = self.samples.saturating_add(1);
    }

    #[inline]
    pub fn on_fault(&mut self) {
        self.faults = self.faults.saturating_add(1);
    }

    #[inline]
    pub fn on_scenario_emitted(&mut self) {
        self.scenarios_emitted = self.scenarios_emitted.saturating_add(1);
    }

    /// Records `score`; returns `true` if it strictly improves the best score.
    #[inline]
    pub fn on_score(&mut self, score: u64) -> bool {
        if self.best_score.is_none_or(|best| score < best) {
            self.best_score = Some(score);
            return true;
        }
        false
    }

    /// Counts an inbound event. Terminal events are not counted here.
    #[inline]
    pub fn on_event(&mut self, event: &SearchEvent) {
        match event {
            SearchEvent::ChoiceMade { .. } => self.choices = self.choices.saturating_add(1),
            SearchEvent::FailureAtNode => self.failures = self.failures.saturating_add(1),
            SearchEvent::ScenarioShared(_) => {
                self.shared_scenarios = self.shared_scenarios.saturating_add(1)
            }
            SearchEvent::GlobalFailure | SearchEvent::StrategyFound => {}
        }
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    /// Number of candidates that were actually scored.
    #[inline]
    pub fn scored_samples(&self) -> u64 {
        self.samples.saturating_sub(self.faults)
    }

    /// Samples per second over the whole run.
    #[inline]
    pub fn throughput(&self) -> f64 {
        let secs = self.time_total.as_secs_f64();
        if secs > 0.0 {
            self.samples as f64 / secs
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for SamplingStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let best = self
            .best_score
            .map_or_else(|| "none".to_string(), |s| s.to_string());

        writeln!(f, "Scout-MC Statistics:")?;
        writeln!(f, "   Samples:            {}", self.samples)?;
        writeln!(f, "   Faults:             {}", self.faults)?;
        writeln!(f, "   Scenarios Emitted:  {}", self.scenarios_emitted)?;
        writeln!(f, "   Choices Observed:   {}", self.choices)?;
        writeln!(f, "   Failures Observed:  {}", self.failures)?;
        writeln!(f, "   Shared Scenarios:   {}", self.shared_scenarios)?;
        writeln!(f, "   Best Score:         {}", best)?;
        writeln!(f, "   Total Time:         {:?}", self.time_total)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_model::{index::VarIndex, instance::Scenario};

    #[test]
    fn test_counters() {
        let mut stats = SamplingStatistics::default();
        stats.on_sample();
        stats.on_sample();
        stats.on_fault();
        stats.on_scenario_emitted();
        assert_eq!(stats.samples, 2);
        assert_eq!(stats.scored_samples(), 1);
        assert_eq!(stats.scenarios_emitted, 1);
    }

    #[test]
    fn test_best_score_only_improves() {
        let mut stats = SamplingStatistics::default();
        assert!(stats.on_score(10));
        assert!(!stats.on_score(10));
        assert!(!stats.on_score(12));
        assert!(stats.on_score(0));
        assert_eq!(stats.best_score, Some(0));
    }

    #[test]
    fn test_event_counters() {
        let mut stats = SamplingStatistics::default();
        stats.on_event(&SearchEvent::ChoiceMade {
            variable: VarIndex::new(0),
            min: 0,
            max: 0,
        });
        stats.on_event(&SearchEvent::FailureAtNode);
        stats.on_event(&SearchEvent::ScenarioShared(Scenario::unassigned(2)));
        stats.on_event(&SearchEvent::GlobalFailure);
        assert_eq!((stats.choices, stats.failures, stats.shared_scenarios), (1, 1, 1));
    }

    #[test]
    fn test_saturation() {
        let mut stats = SamplingStatistics {
            samples: u64::MAX,
            ..Default::default()
        };
        stats.on_sample();
        assert_eq!(stats.samples, u64::MAX);
    }

    #[test]
    fn test_throughput() {
        let mut stats = SamplingStatistics::default();
        assert_eq!(stats.throughput(), 0.0);
        stats.samples = 500;
        stats.set_total_time(Duration::from_millis(250));
        assert!((stats.throughput() - 2_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_mentions_counters() {
        let stats = SamplingStatistics {
            samples: 7,
            best_score: Some(3),
            ..Default::default()
        };
        let text = stats.to_string();
        assert!(text.contains("Samples:            7"));
        assert!(text.contains("Best Score:         3"));
    }
}
