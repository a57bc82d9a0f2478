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

//! # Async Worker
//!
//! Owns the background thread that runs the sampling loop next to the exact
//! search.
//!
//! ## Lifecycle
//!
//! `Idle → Running → Stopping → Stopped`, where `Stopped` is absorbing.
//!
//! - `start` moves an idle worker to `Running`; it fails with `NotClosed` if
//!   the model is still being built.
//! - `request_stop` never blocks. It moves a running worker to `Stopping` and
//!   wakes it even if it is blocked on a full outbound queue.
//! - A terminal search event, a stop request, a disconnected bridge or a
//!   monitor limit ends the loop. The thread then releases the bridge and
//!   publishes `Stopped`.
//!
//! ## Shutdown disciplines
//!
//! - `Join`: `await_stopped` blocks until the worker is `Stopped` and returns
//!   its `WorkerOutcome`, or the fatal error that ended it. Dropping the worker
//!   requests a stop and waits for the thread.
//! - `Detach`: `await_stopped` returns `Ok(None)` at once. Dropping the worker
//!   requests a stop and returns without waiting; the thread winds down on its
//!   own and logs any fatal error itself.

use crate::{
    config::{ShutdownDiscipline, WorkerConfig},
    engine::SamplingEngine,
    error::WorkerError,
    result::WorkerOutcome,
    sampler::{InstanceSampler, UniformSampler},
    scorer::ConstraintScorer,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use scout_model::{error::ModelError, mirror::ModelMirror};
use scout_search::{
    bridge::{self, SearchHandle, StopHandle, StopListener, WorkerEndpoint},
    monitor::{
        composite::CompositeMonitor, interrupt::InterruptMonitor, log::LogMonitor,
        sample_limit::SampleLimitMonitor, time_limit::TimeLimitMonitor,
    },
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
    thread::JoinHandle,
};

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum WorkerState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

impl WorkerState {
    #[inline]
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Idle,
            1 => WorkerState::Running,
            2 => WorkerState::Stopping,
            _ => WorkerState::Stopped,
        }
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerState::Idle => write!(f, "Idle"),
            WorkerState::Running => write!(f, "Running"),
            WorkerState::Stopping => write!(f, "Stopping"),
            WorkerState::Stopped => write!(f, "Stopped"),
        }
    }
}

type WorkerResult = Result<WorkerOutcome, WorkerError>;

pub struct AsyncWorker {
    config: WorkerConfig,
    state: Arc<AtomicU8>,
    stop: Option<StopHandle>,
    thread: Option<JoinHandle<WorkerResult>>,
}

impl std::fmt::Debug for AsyncWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncWorker")
            .field("discipline", &self.config.discipline())
            .field("state", &self.state())
            .finish()
    }
}

impl AsyncWorker {
    /// Thread name of every worker.
    pub const THREAD_NAME: &'static str = "scout-mc-worker";

    #[inline]
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config,
            state: Arc::new(AtomicU8::new(WorkerState::Idle as u8)),
            stop: None,
            thread: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    #[inline]
    pub fn discipline(&self) -> ShutdownDiscipline {
        self.config.discipline()
    }

    #[inline]
    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.state() == WorkerState::Stopped
    }

    /// Creates a bridge sized by the configured outbound capacity.
    #[inline]
    pub fn channel(&self) -> (SearchHandle, WorkerEndpoint) {
        bridge::channel(self.config.outbound_capacity())
    }

    /// Starts sampling `model` with a `UniformSampler`.
    ///
    /// # Errors
    ///
    /// - `Model(NotClosed)` if `model` is still in its building phase.
    /// - `AlreadyStarted` if this worker was started before.
    /// - `Spawn` if the thread could not be created.
    pub fn start(
        &mut self,
        model: Arc<ModelMirror>,
        endpoint: WorkerEndpoint,
    ) -> Result<(), WorkerError> {
        self.start_with_sampler(model, endpoint, UniformSampler::new())
    }

    /// Starts sampling `model` with `sampler`.
    ///
    /// # Errors
    ///
    /// Same as `start`.
    pub fn start_with_sampler<S>(
        &mut self,
        model: Arc<ModelMirror>,
        endpoint: WorkerEndpoint,
        sampler: S,
    ) -> Result<(), WorkerError>
    where
        S: InstanceSampler + Send + 'static,
    {
        if !model.is_closed() {
            return Err(ModelError::NotClosed.into());
        }
        if self
            .state
            .compare_exchange(
                WorkerState::Idle as u8,
                WorkerState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return Err(WorkerError::AlreadyStarted);
        }

        let seed = self.config.seed().unwrap_or_else(|| rand::rng().random());
        let (stop, listener) = bridge::stop_signal();
        let config = self.config.clone();
        let state = Arc::clone(&self.state);
        let sampler_name = sampler.name().to_string();

        let spawned = std::thread::Builder::new()
            .name(Self::THREAD_NAME.to_string())
            .spawn(move || {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    run_worker(&config, &model, endpoint, &listener, sampler, seed, &state)
                }))
                .unwrap_or_else(|payload| Err(WorkerError::from_panic(payload)));

                if let Err(error) = &result {
                    tracing::error!(%error, "sampling worker failed");
                }
                state.store(WorkerState::Stopped as u8, Ordering::Release);
                result
            });

        match spawned {
            Ok(handle) => {
                tracing::info!(
                    seed,
                    discipline = %self.config.discipline(),
                    sampler = %sampler_name,
                    "sampling worker started"
                );
                self.stop = Some(stop);
                self.thread = Some(handle);
                Ok(())
            }
            Err(error) => {
                self.state
                    .store(WorkerState::Idle as u8, Ordering::Release);
                Err(WorkerError::Spawn(error.to_string()))
            }
        }
    }

    /// Asks the worker to stop. Never blocks; a no-op if it was never started.
    pub fn request_stop(&self) {
        let Some(stop) = &self.stop else {
            return;
        };
        if self
            .state
            .compare_exchange(
                WorkerState::Running as u8,
                WorkerState::Stopping as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            tracing::debug!("stop requested");
        }
        stop.request_stop();
    }

    /// In join discipline, blocks until the worker is `Stopped` and returns its
    /// outcome; `Ok(None)` if it was never started or already awaited.
    /// In detach discipline, returns `Ok(None)` immediately.
    ///
    /// This does not request a stop by itself.
    ///
    /// # Errors
    ///
    /// `ProtocolViolation` or `Panicked` if the worker ended with a fatal error.
    pub fn await_stopped(&mut self) -> Result<Option<WorkerOutcome>, WorkerError> {
        match self.config.discipline() {
            ShutdownDiscipline::Detach => Ok(None),
            ShutdownDiscipline::Join => {
                let Some(handle) = self.thread.take() else {
                    return Ok(None);
                };
                match handle.join() {
                    Ok(result) => result.map(Some),
                    Err(payload) => Err(WorkerError::from_panic(payload)),
                }
            }
        }
    }
}

impl Drop for AsyncWorker {
    fn drop(&mut self) {
        self.request_stop();
        if self.config.discipline() != ShutdownDiscipline::Join {
            return;
        }
        if let Some(handle) = self.thread.take() {
            // Errors were already logged by the worker thread.
            let _ = handle.join();
        }
    }
}

/// Body of the worker thread.
fn run_worker<S>(
    config: &WorkerConfig,
    model: &ModelMirror,
    mut endpoint: WorkerEndpoint,
    stop: &StopListener,
    sampler: S,
    seed: u64,
    state: &AtomicU8,
) -> WorkerResult
where
    S: InstanceSampler,
{
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut monitor = CompositeMonitor::with_capacity(4);
    if let Some(flag) = config.interrupt() {
        monitor.add_monitor(InterruptMonitor::new(flag.as_ref()));
    }
    if let Some(limit) = config.sample_limit() {
        monitor.add_monitor(SampleLimitMonitor::new(limit));
    }
    if let Some(limit) = config.time_limit() {
        monitor.add_monitor(TimeLimitMonitor::new(limit));
    }
    if let Some(interval) = config.log_interval() {
        monitor.add_monitor(LogMonitor::new(
            interval,
            LogMonitor::DEFAULT_SAMPLE_CLOCK_CHECK_MASK,
        ));
    }

    let mut engine = SamplingEngine::new(sampler, ConstraintScorer::new())
        .with_report_threshold(config.report_threshold())
        .with_report_improvements(config.report_improvements());

    let outcome = engine
        .run(model, &mut endpoint, stop, &mut monitor, &mut rng)?
        .with_seed(seed);

    let _ = state.compare_exchange(
        WorkerState::Running as u8,
        WorkerState::Stopping as u8,
        Ordering::AcqRel,
        Ordering::Acquire,
    );
    // Closing the outbound queue lets the exact search see the end of the reports.
    drop(endpoint);

    let stats = outcome.statistics();
    tracing::info!(
        reason = %outcome.termination_reason(),
        samples = stats.samples,
        faults = stats.faults,
        scenarios = stats.scenarios_emitted,
        best_score = ?stats.best_score,
        elapsed = ?stats.time_total,
        "sampling worker stopped"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::WorkerConfigBuilder, domains::SamplingDomains, result::WorkerTerminationReason,
    };
    use scout_model::{
        constraint::Comparison,
        instance::Instance,
        variable::{Quantifier, VarType},
    };
    use std::time::{Duration, Instant};

    /// x == y with x ∈ [0, 0] and y ∈ [1, 1]: never satisfiable.
    fn unsatisfiable() -> Arc<ModelMirror> {
        let mut m = ModelMirror::new();
        m.register_variable("x", Quantifier::Exists, VarType::Int, 0, 0)
            .unwrap();
        m.register_variable("y", Quantifier::Forall, VarType::Int, 1, 1)
            .unwrap();
        m.register_linear_constraint([(1, "x")], Comparison::Eq, "y")
            .unwrap();
        m.close().unwrap();
        Arc::new(m)
    }

    /// x == y with x, y ∈ [3, 3]: every candidate satisfies it.
    fn always_satisfied() -> Arc<ModelMirror> {
        let mut m = ModelMirror::new();
        m.register_variable("x", Quantifier::Exists, VarType::Int, 3, 3)
            .unwrap();
        m.register_variable("y", Quantifier::Forall, VarType::Int, 3, 3)
            .unwrap();
        m.register_linear_constraint([(1, "x")], Comparison::Eq, "y")
            .unwrap();
        m.close().unwrap();
        Arc::new(m)
    }

    fn wait_until_stopped(worker: &AsyncWorker) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !worker.is_stopped() {
            assert!(Instant::now() < deadline, "worker did not stop in time");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    struct PanickingSampler;

    impl InstanceSampler for PanickingSampler {
        fn name(&self) -> &str {
            "PanickingSampler"
        }

        fn sample_into<R>(&mut self, _domains: &SamplingDomains, _rng: &mut R, _instance: &mut Instance)
        where
            R: Rng,
        {
            panic!("sampler exploded");
        }
    }

    #[test]
    fn test_start_requires_a_closed_model() {
        let mut worker = AsyncWorker::new(WorkerConfig::default());
        let (_search, endpoint) = worker.channel();

        let result = worker.start(Arc::new(ModelMirror::new()), endpoint);
        assert_eq!(result, Err(WorkerError::Model(ModelError::NotClosed)));
        assert_eq!(worker.state(), WorkerState::Idle);
    }

    #[test]
    fn test_start_twice_fails() {
        let mut worker = AsyncWorker::new(WorkerConfig::default());
        let (_search, endpoint) = worker.channel();
        worker.start(unsatisfiable(), endpoint).unwrap();

        let (_other, endpoint) = worker.channel();
        assert_eq!(
            worker.start(unsatisfiable(), endpoint),
            Err(WorkerError::AlreadyStarted)
        );
        worker.request_stop();
        assert!(worker.await_stopped().unwrap().is_some());
    }

    #[test]
    fn test_join_returns_after_stopped() {
        let mut worker = AsyncWorker::new(WorkerConfigBuilder::new().with_seed(3).build());
        let (_search, endpoint) = worker.channel();
        worker.start(unsatisfiable(), endpoint).unwrap();

        worker.request_stop();
        let outcome = worker.await_stopped().unwrap().unwrap();

        assert_eq!(worker.state(), WorkerState::Stopped);
        assert_eq!(
            outcome.termination_reason(),
            &WorkerTerminationReason::StopRequested
        );
        assert_eq!(outcome.seed(), Some(3));
        assert_eq!(outcome.statistics().scenarios_emitted, 0);
        // Already awaited.
        assert_eq!(worker.await_stopped(), Ok(None));
    }

    #[test]
    fn test_sample_limit_stops_the_worker() {
        let config = WorkerConfigBuilder::new().with_sample_limit(100).build();
        let mut worker = AsyncWorker::new(config);
        let (_search, endpoint) = worker.channel();
        worker.start(unsatisfiable(), endpoint).unwrap();

        let outcome = worker.await_stopped().unwrap().unwrap();
        assert_eq!(
            outcome.termination_reason(),
            &WorkerTerminationReason::Aborted("sample limit reached".to_string())
        );
        assert_eq!(outcome.statistics().samples, 100);
        assert_eq!(outcome.best_score(), Some(1));
    }

    #[test]
    fn test_external_interrupt_stops_the_worker() {
        let flag = Arc::new(std::sync::atomic::AtomicBool::new(true));
        let config = WorkerConfigBuilder::new()
            .with_interrupt(Arc::clone(&flag))
            .build();
        let mut worker = AsyncWorker::new(config);
        let (_search, endpoint) = worker.channel();
        worker.start(unsatisfiable(), endpoint).unwrap();

        let outcome = worker.await_stopped().unwrap().unwrap();
        assert_eq!(
            outcome.termination_reason(),
            &WorkerTerminationReason::Aborted("Interrupt signal received".to_string())
        );
    }

    #[test]
    fn test_panics_surface_as_errors() {
        let mut worker = AsyncWorker::new(WorkerConfig::default());
        let (_search, endpoint) = worker.channel();
        worker
            .start_with_sampler(unsatisfiable(), endpoint, PanickingSampler)
            .unwrap();

        let result = worker.await_stopped();
        assert_eq!(
            result,
            Err(WorkerError::Panicked("sampler exploded".to_string()))
        );
        assert_eq!(worker.state(), WorkerState::Stopped);
    }

    #[test]
    fn test_detach_await_returns_immediately() {
        let config = WorkerConfigBuilder::new()
            .with_discipline(ShutdownDiscipline::Detach)
            .build();
        let mut worker = AsyncWorker::new(config);
        let (_search, endpoint) = worker.channel();
        worker.start(unsatisfiable(), endpoint).unwrap();

        assert_eq!(worker.await_stopped(), Ok(None));
        assert_ne!(worker.state(), WorkerState::Stopped);

        worker.request_stop();
        wait_until_stopped(&worker);
    }

    #[test]
    fn test_search_disconnect_stops_the_worker() {
        let mut worker = AsyncWorker::new(WorkerConfig::default());
        let (search, endpoint) = worker.channel();
        worker.start(unsatisfiable(), endpoint).unwrap();

        drop(search);
        let outcome = worker.await_stopped().unwrap().unwrap();
        assert_eq!(
            outcome.termination_reason(),
            &WorkerTerminationReason::SearchDisconnected
        );
    }

    #[test]
    fn test_drop_in_join_waits_for_stopped() {
        let worker_state;
        {
            let mut worker = AsyncWorker::new(WorkerConfig::default());
            let (_search, endpoint) = worker.channel();
            worker.start(always_satisfied(), endpoint).unwrap();
            worker_state = Arc::clone(&worker.state);
        }
        assert_eq!(
            WorkerState::from_u8(worker_state.load(Ordering::Acquire)),
            WorkerState::Stopped
        );
    }

    #[test]
    fn test_drop_in_detach_does_not_block() {
        let config = WorkerConfigBuilder::new()
            .with_discipline(ShutdownDiscipline::Detach)
            .with_outbound_capacity(1)
            .build();
        let mut worker = AsyncWorker::new(config);
        let (search, endpoint) = worker.channel();
        worker.start(always_satisfied(), endpoint).unwrap();

        // The queue fills up and the worker blocks on its second report.
        while search.pending_scenarios() == 0 {
            std::thread::yield_now();
        }
        let worker_state = Arc::clone(&worker.state);

        let started = Instant::now();
        drop(worker);
        assert!(started.elapsed() < Duration::from_secs(1));

        let deadline = Instant::now() + Duration::from_secs(10);
        while WorkerState::from_u8(worker_state.load(Ordering::Acquire)) != WorkerState::Stopped {
            assert!(Instant::now() < deadline, "detached worker did not stop");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_state_display() {
        assert_eq!(WorkerState::Stopping.to_string(), "Stopping");
        assert_eq!(WorkerState::from_u8(1), WorkerState::Running);
    }
}
