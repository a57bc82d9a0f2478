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

//! Sampling loop.
//!
//! The engine repeatedly draws a candidate from the current sampling domains,
//! scores it against the model and reports it to the exact search when it is
//! promising, while the bridge feeds branching events back into the domains.
//! Termination comes from the bridge (terminal event, stop request,
//! disconnection) or from a monitor (limits, interrupt). Scoring faults discard
//! the candidate and never end the run. The final outcome bundles the best
//! candidate seen, the run statistics and the termination reason.

use crate::{
    domains::SamplingDomains,
    result::{WorkerOutcome, WorkerTerminationReason},
    sampler::InstanceSampler,
    scorer::ViolationScorer,
    stats::SamplingStatistics,
};
use rand::Rng;
use scout_model::{
    instance::{Instance, Scenario},
    mirror::ModelMirror,
};
use scout_search::{
    bridge::{Flow, SearchEventHandler, StopListener, WorkerEndpoint},
    error::BridgeError,
    event::SearchEvent,
    monitor::sampling_monitor::{SamplingMonitor, SearchCommand},
};
use std::time::Instant;

/// Routes inbound events into the sampling domains and the statistics.
struct EventSink<'a> {
    domains: &'a mut SamplingDomains,
    stats: &'a mut SamplingStatistics,
}

impl<'a> EventSink<'a> {
    #[inline]
    fn new(domains: &'a mut SamplingDomains, stats: &'a mut SamplingStatistics) -> Self {
        Self { domains, stats }
    }
}

impl SearchEventHandler for EventSink<'_> {
    #[inline]
    fn on_search_event(&mut self, event: SearchEvent) {
        self.stats.on_event(&event);
        self.domains.apply(event);
    }
}

/// The sample, score and report loop of a worker.
#[derive(Debug, Clone)]
pub struct SamplingEngine<S, V> {
    sampler: S,
    scorer: V,
    report_threshold: u64,
    report_improvements: bool,
}

impl<S, V> SamplingEngine<S, V>
where
    S: InstanceSampler,
    V: ViolationScorer,
{
    /// Creates an engine reporting only fully satisfying candidates.
    #[inline]
    pub fn new(sampler: S, scorer: V) -> Self {
        Self {
            sampler,
            scorer,
            report_threshold: 0,
            report_improvements: false,
        }
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
    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    #[inline]
    pub fn scorer(&self) -> &V {
        &self.scorer
    }

    /// Returns `true` if a candidate with `score` must be reported.
    #[inline]
    fn is_reportable(&self, score: u64, improved: bool) -> bool {
        score <= self.report_threshold || (self.report_improvements && improved)
    }

    /// Runs the loop until the bridge or `monitor` stops it.
    ///
    /// `model` must be the closed mirror the exact search was built from.
    ///
    /// # Errors
    ///
    /// Returns the bridge's `ProtocolViolation` if a report is attempted after
    /// the endpoint stopped. Sampling faults are absorbed.
    pub fn run<M, R>(
        &mut self,
        model: &ModelMirror,
        endpoint: &mut WorkerEndpoint,
        stop: &StopListener,
        monitor: &mut M,
        rng: &mut R,
    ) -> Result<WorkerOutcome, BridgeError>
    where
        M: SamplingMonitor + ?Sized,
        R: Rng,
    {
        debug_assert!(
            model.is_closed(),
            "called `SamplingEngine::run` with a model that is not closed"
        );

        let start_time = Instant::now();
        let mut stats = SamplingStatistics::default();
        let mut domains = SamplingDomains::new(model);
        let mut candidate = Instance::zeroed(model.num_variables());
        let mut best: Option<(Instance, u64)> = None;

        monitor.on_enter_sampling(model);

        let termination_reason: WorkerTerminationReason = loop {
            if let Flow::Stop(reason) =
                endpoint.poll(&mut EventSink::new(&mut domains, &mut stats), stop)
            {
                break reason.into();
            }

            if let SearchCommand::Terminate(reason) = monitor.search_command() {
                break WorkerTerminationReason::Aborted(reason);
            }

            self.sampler.sample_into(&domains, rng, &mut candidate);
            stats.on_sample();

            let score = match self.scorer.score(model, &candidate) {
                Ok(score) => score,
                Err(fault) => {
                    stats.on_fault();
                    tracing::warn!(%fault, sample = stats.samples, "candidate discarded");
                    monitor.on_sample(None);
                    continue;
                }
            };
            monitor.on_sample(Some(score));

            let improved = stats.on_score(score);
            if improved {
                match &mut best {
                    Some((instance, best_score)) => {
                        instance.clone_from(&candidate);
                        *best_score = score;
                    }
                    None => best = Some((candidate.clone(), score)),
                }
            }

            if !self.is_reportable(score, improved) {
                continue;
            }

            let flow = endpoint.emit(
                Scenario::from(&candidate),
                score,
                &mut EventSink::new(&mut domains, &mut stats),
                stop,
            )?;

            match flow {
                Flow::Continue => {
                    stats.on_scenario_emitted();
                    monitor.on_scenario(&candidate, score);
                }
                Flow::Stop(reason) => break reason.into(),
            }
        };

        stats.set_total_time(start_time.elapsed());
        monitor.on_exit_sampling();

        Ok(WorkerOutcome::new(termination_reason, best, stats))
    }
}
