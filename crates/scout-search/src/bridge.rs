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

//! # Search Bridge
//!
//! A typed, ordered, two-way channel between the exact search and the
//! sampling worker.
//!
//! ## Motivation
//!
//! The exact search and the worker are scheduled independently. The exact
//! search must be able to push progress events without ever blocking, and the
//! worker must be able to report scenarios without ever outliving a terminal
//! event or a stop request, even while it waits for space in the outbound queue.
//!
//! ## Highlights
//!
//! - Inbound events travel through an unbounded queue, so the exact search never
//!   blocks and terminal events are never dropped.
//! - Outbound reports travel through a bounded queue; `WorkerEndpoint::emit`
//!   blocks on a `crossbeam_channel::Select` over the send, the inbound queue and
//!   the stop signal, so a terminal event or a stop request always wins over a
//!   pending report.
//! - The endpoint records the first terminal event it reads and never reads past
//!   it. Any report attempted afterwards is a `BridgeError::ProtocolViolation`.
//! - Reports carry a per-sender sequence number; `SearchHandle` drops repeated
//!   deliveries.
//! - Dropping the `SearchHandle` disconnects the bridge and stops the worker with
//!   `StopReason::SearchDisconnected`.
//!
//! ## Usage
//!
//! ```rust
//! use scout_search::bridge::{self, Flow};
//! use scout_search::event::SearchEvent;
//! use scout_model::instance::Scenario;
//!
//! let (mut search, mut endpoint) = bridge::channel(8);
//! let (_stop, listener) = bridge::stop_signal();
//!
//! let mut seen = Vec::new();
//! let mut handler = |event: SearchEvent| seen.push(event);
//!
//! let flow = endpoint
//!     .emit(Scenario::new(vec![Some(1)]), 0, &mut handler, &listener)
//!     .unwrap();
//! assert_eq!(flow, Flow::Continue);
//! assert_eq!(search.try_next_scenario().unwrap().score(), 0);
//!
//! search.strategy_found();
//! assert!(endpoint.poll(&mut handler, &listener).is_stop());
//! ```

use crate::{
    error::BridgeError,
    event::{PromisingScenario, SearchEvent, StopReason},
};
use crossbeam_channel::{Receiver, RecvError, Select, Sender, TryRecvError, TrySendError};
use scout_model::{index::VarIndex, instance::Scenario};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Receives the non-terminal events read by a `WorkerEndpoint`.
///
/// Terminal events are never dispatched; they surface as `Flow::Stop`.
pub trait SearchEventHandler {
    fn on_search_event(&mut self, event: SearchEvent);
}

impl<F> SearchEventHandler for F
where
    F: FnMut(SearchEvent),
{
    #[inline]
    fn on_search_event(&mut self, event: SearchEvent) {
        self(event)
    }
}

/// Whether the worker may keep sampling.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Flow {
    Continue,
    Stop(StopReason),
}

impl Flow {
    #[inline]
    pub fn is_stop(&self) -> bool {
        matches!(self, Flow::Stop(_))
    }
}

/// Creates a bridge whose outbound queue holds at most `capacity` reports.
pub fn channel(capacity: usize) -> (SearchHandle, WorkerEndpoint) {
    let (inbound_tx, inbound_rx) = crossbeam_channel::unbounded();
    let (outbound_tx, outbound_rx) = crossbeam_channel::bounded(capacity);

    let handle = SearchHandle {
        inbound: inbound_tx,
        outbound: outbound_rx,
        last_sequence: None,
    };
    let endpoint = WorkerEndpoint {
        inbound: inbound_rx,
        outbound: outbound_tx,
        observed_events: 0,
        next_sequence: 0,
        stopped: None,
    };
    (handle, endpoint)
}

/// Creates a stop signal shared between the owner of a worker and the worker.
///
/// Dropping every `StopHandle` counts as a stop request.
pub fn stop_signal() -> (StopHandle, StopListener) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let flag = Arc::new(AtomicBool::new(false));
    (
        StopHandle {
            tx,
            flag: Arc::clone(&flag),
        },
        StopListener { rx, flag },
    )
}

/// The owner's side of the stop signal. Never blocks.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Sender<()>,
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    #[inline]
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::Release);
        // A full queue already carries a wake-up token.
        let _ = self.tx.try_send(());
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// The worker's side of the stop signal.
#[derive(Debug, Clone)]
pub struct StopListener {
    rx: Receiver<()>,
    flag: Arc<AtomicBool>,
}

impl StopListener {
    /// Returns `true` once a stop was requested or every `StopHandle` is gone.
    ///
    /// A wake-up token read here is a stop request even if the flag store is
    /// not visible yet; the flag is set so later calls agree.
    #[inline]
    pub fn is_requested(&self) -> bool {
        if self.flag.load(Ordering::Acquire) {
            return true;
        }
        match self.rx.try_recv() {
            Ok(()) => {
                self.flag.store(true, Ordering::Release);
                true
            }
            Err(TryRecvError::Disconnected) => true,
            Err(TryRecvError::Empty) => false,
        }
    }
}

/// The exact search's side of the bridge.
#[derive(Debug)]
pub struct SearchHandle {
    inbound: Sender<SearchEvent>,
    outbound: Receiver<PromisingScenario>,
    last_sequence: Option<u64>,
}

impl SearchHandle {
    /// Pushes an event to the worker. Returns `false` if the worker is gone.
    #[inline]
    pub fn notify(&self, event: SearchEvent) -> bool {
        tracing::trace!(event = %event, "search event sent");
        self.inbound.send(event).is_ok()
    }

    #[inline]
    pub fn choice_made(&self, variable: VarIndex, min: i64, max: i64) -> bool {
        self.notify(SearchEvent::ChoiceMade { variable, min, max })
    }

    #[inline]
    pub fn failure_at_node(&self) -> bool {
        self.notify(SearchEvent::FailureAtNode)
    }

    #[inline]
    pub fn global_failure(&self) -> bool {
        self.notify(SearchEvent::GlobalFailure)
    }

    #[inline]
    pub fn strategy_found(&self) -> bool {
        self.notify(SearchEvent::StrategyFound)
    }

    #[inline]
    pub fn scenario_shared(&self, scenario: Scenario) -> bool {
        self.notify(SearchEvent::ScenarioShared(scenario))
    }

    #[inline]
    fn accept(&mut self, scenario: PromisingScenario) -> Option<PromisingScenario> {
        if self
            .last_sequence
            .is_none_or(|last| scenario.sequence() > last)
        {
            self.last_sequence = Some(scenario.sequence());
            Some(scenario)
        } else {
            tracing::trace!(sequence = scenario.sequence(), "duplicate scenario dropped");
            None
        }
    }

    /// Returns the next pending report without blocking.
    pub fn try_next_scenario(&mut self) -> Option<PromisingScenario> {
        while let Ok(scenario) = self.outbound.try_recv() {
            if let Some(scenario) = self.accept(scenario) {
                return Some(scenario);
            }
        }
        None
    }

    /// Blocks until the next report arrives. Returns `None` once the worker has
    /// dropped its endpoint and every pending report has been read.
    pub fn next_scenario(&mut self) -> Option<PromisingScenario> {
        while let Ok(scenario) = self.outbound.recv() {
            if let Some(scenario) = self.accept(scenario) {
                return Some(scenario);
            }
        }
        None
    }

    /// Like `next_scenario`, giving up after `timeout`.
    pub fn next_scenario_timeout(
        &mut self,
        timeout: std::time::Duration,
    ) -> Option<PromisingScenario> {
        let deadline = std::time::Instant::now() + timeout;
        while let Ok(scenario) = self.outbound.recv_deadline(deadline) {
            if let Some(scenario) = self.accept(scenario) {
                return Some(scenario);
            }
        }
        None
    }

    /// Reads every pending report without blocking.
    pub fn drain_scenarios(&mut self) -> Vec<PromisingScenario> {
        let mut scenarios = Vec::with_capacity(self.outbound.len());
        while let Some(scenario) = self.try_next_scenario() {
            scenarios.push(scenario);
        }
        scenarios
    }

    #[inline]
    pub fn pending_scenarios(&self) -> usize {
        self.outbound.len()
    }
}

/// The worker's side of the bridge.
#[derive(Debug)]
pub struct WorkerEndpoint {
    inbound: Receiver<SearchEvent>,
    outbound: Sender<PromisingScenario>,
    observed_events: u64,
    next_sequence: u64,
    stopped: Option<StopReason>,
}

impl WorkerEndpoint {
    /// Maximum number of events read by a single `poll`.
    const POLL_BATCH: usize = 1024;

    /// Number of inbound events read so far, terminal ones included.
    #[inline]
    pub fn observed_events(&self) -> u64 {
        self.observed_events
    }

    /// Number of reports handed to the outbound queue so far.
    #[inline]
    pub fn emitted(&self) -> u64 {
        self.next_sequence
    }

    #[inline]
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stopped
    }

    #[inline]
    fn stop(&mut self, reason: StopReason) -> Flow {
        let reason = *self.stopped.get_or_insert(reason);
        Flow::Stop(reason)
    }

    #[inline]
    fn dispatch<H>(&mut self, event: SearchEvent, handler: &mut H) -> Flow
    where
        H: SearchEventHandler + ?Sized,
    {
        self.observed_events = self.observed_events.saturating_add(1);
        tracing::debug!(event = %event, observed = self.observed_events, "search event received");

        match event {
            SearchEvent::GlobalFailure => self.stop(StopReason::GlobalFailure),
            SearchEvent::StrategyFound => self.stop(StopReason::StrategyFound),
            event => {
                handler.on_search_event(event);
                Flow::Continue
            }
        }
    }

    /// Reads pending inbound events without blocking and forwards the
    /// non-terminal ones to `handler`.
    ///
    /// Once a stop was observed, every later call returns the same
    /// `Flow::Stop` without reading further events.
    pub fn poll<H>(&mut self, handler: &mut H, stop: &StopListener) -> Flow
    where
        H: SearchEventHandler + ?Sized,
    {
        if let Some(reason) = self.stopped {
            return Flow::Stop(reason);
        }

        for _ in 0..Self::POLL_BATCH {
            match self.inbound.try_recv() {
                Ok(event) => {
                    if let Flow::Stop(reason) = self.dispatch(event, handler) {
                        return Flow::Stop(reason);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return self.stop(StopReason::SearchDisconnected);
                }
            }
        }

        if stop.is_requested() {
            return self.stop(StopReason::StopRequested);
        }
        Flow::Continue
    }

    /// Reports `scenario` to the exact search.
    ///
    /// Pending inbound events are read first; if one of them is terminal the
    /// scenario is discarded. While the outbound queue is full this blocks until
    /// there is space, an inbound event arrives, or a stop is requested.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ProtocolViolation` if the endpoint already stopped.
    pub fn emit<H>(
        &mut self,
        scenario: Scenario,
        score: u64,
        handler: &mut H,
        stop: &StopListener,
    ) -> Result<Flow, BridgeError>
    where
        H: SearchEventHandler + ?Sized,
    {
        if let Some(reason) = self.stopped {
            tracing::error!(sequence = self.next_sequence, %reason, "scenario emitted after the bridge stopped");
            return Err(BridgeError::ProtocolViolation {
                sequence: self.next_sequence,
                reason,
            });
        }

        if let Flow::Stop(reason) = self.poll(handler, stop) {
            return Ok(Flow::Stop(reason));
        }

        let mut message =
            PromisingScenario::new(scenario, score, self.next_sequence, self.observed_events);

        loop {
            match self.outbound.try_send(message) {
                Ok(()) => return Ok(self.sent()),
                Err(TrySendError::Disconnected(_)) => {
                    return Ok(self.stop(StopReason::SearchDisconnected));
                }
                Err(TrySendError::Full(returned)) => message = returned,
            }

            let mut select = Select::new();
            let send_index = select.send(&self.outbound);
            let inbound_index = select.recv(&self.inbound);
            let stop_index = select.recv(&stop.rx);
            let operation = select.select();

            match operation.index() {
                index if index == send_index => {
                    return match operation.send(&self.outbound, message) {
                        Ok(()) => Ok(self.sent()),
                        Err(_) => Ok(self.stop(StopReason::SearchDisconnected)),
                    };
                }
                index if index == inbound_index => match operation.recv(&self.inbound) {
                    Ok(event) => {
                        if let Flow::Stop(reason) = self.dispatch(event, handler) {
                            return Ok(Flow::Stop(reason));
                        }
                    }
                    Err(RecvError) => return Ok(self.stop(StopReason::SearchDisconnected)),
                },
                index => {
                    debug_assert_eq!(index, stop_index);
                    let _ = operation.recv(&stop.rx);
                    return Ok(self.stop(StopReason::StopRequested));
                }
            }
        }
    }

    #[inline]
    fn sent(&mut self) -> Flow {
        tracing::debug!(sequence = self.next_sequence, "promising scenario emitted");
        self.next_sequence += 1;
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn partial(values: &[Option<i64>]) -> Scenario {
        Scenario::new(values.to_vec())
    }

    #[test]
    fn test_events_are_delivered_in_order() {
        let (search, mut endpoint) = channel(4);
        let (_stop, listener) = stop_signal();

        search.choice_made(VarIndex::new(0), 1, 5);
        search.failure_at_node();
        search.scenario_shared(partial(&[Some(2), None]));
        search.choice_made(VarIndex::new(1), 3, 3);

        let mut seen = Vec::new();
        let mut handler = |event: SearchEvent| seen.push(event);
        assert_eq!(endpoint.poll(&mut handler, &listener), Flow::Continue);

        assert_eq!(
            seen,
            vec![
                SearchEvent::ChoiceMade {
                    variable: VarIndex::new(0),
                    min: 1,
                    max: 5
                },
                SearchEvent::FailureAtNode,
                SearchEvent::ScenarioShared(partial(&[Some(2), None])),
                SearchEvent::ChoiceMade {
                    variable: VarIndex::new(1),
                    min: 3,
                    max: 3
                },
            ]
        );
        assert_eq!(endpoint.observed_events(), 4);
    }

    #[test]
    fn test_terminal_event_is_observed_once_and_never_read_past() {
        let (search, mut endpoint) = channel(4);
        let (_stop, listener) = stop_signal();

        search.failure_at_node();
        search.global_failure();
        search.choice_made(VarIndex::new(0), 0, 0);
        search.strategy_found();

        let mut seen = Vec::new();
        let mut handler = |event: SearchEvent| seen.push(event);
        assert_eq!(
            endpoint.poll(&mut handler, &listener),
            Flow::Stop(StopReason::GlobalFailure)
        );
        assert_eq!(
            endpoint.poll(&mut handler, &listener),
            Flow::Stop(StopReason::GlobalFailure)
        );
        assert_eq!(seen, vec![SearchEvent::FailureAtNode]);
        assert_eq!(endpoint.observed_events(), 2);
        assert_eq!(endpoint.stop_reason(), Some(StopReason::GlobalFailure));
    }

    #[test]
    fn test_emit_after_stop_is_a_protocol_violation() {
        let (mut search, mut endpoint) = channel(4);
        let (_stop, listener) = stop_signal();
        let mut handler = |_: SearchEvent| {};

        search.strategy_found();
        assert!(endpoint.poll(&mut handler, &listener).is_stop());

        let result = endpoint.emit(partial(&[Some(1)]), 0, &mut handler, &listener);
        assert_eq!(
            result,
            Err(BridgeError::ProtocolViolation {
                sequence: 0,
                reason: StopReason::StrategyFound
            })
        );
        assert!(search.try_next_scenario().is_none());
    }

    #[test]
    fn test_emit_discards_scenario_when_terminal_event_is_pending() {
        let (mut search, mut endpoint) = channel(4);
        let (_stop, listener) = stop_signal();
        let mut handler = |_: SearchEvent| {};

        search.strategy_found();
        let flow = endpoint
            .emit(partial(&[Some(1)]), 0, &mut handler, &listener)
            .unwrap();
        assert_eq!(flow, Flow::Stop(StopReason::StrategyFound));
        assert_eq!(endpoint.emitted(), 0);
        assert!(search.try_next_scenario().is_none());
    }

    #[test]
    fn test_emit_carries_sequence_and_observed_events() {
        let (mut search, mut endpoint) = channel(4);
        let (_stop, listener) = stop_signal();
        let mut handler = |_: SearchEvent| {};

        endpoint
            .emit(partial(&[Some(1)]), 0, &mut handler, &listener)
            .unwrap();
        search.failure_at_node();
        endpoint
            .emit(partial(&[Some(2)]), 3, &mut handler, &listener)
            .unwrap();

        let reports = search.drain_scenarios();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].sequence(), 0);
        assert_eq!(reports[0].observed_events(), 0);
        assert_eq!(reports[1].sequence(), 1);
        assert_eq!(reports[1].observed_events(), 1);
        assert_eq!(reports[1].score(), 3);
    }

    #[test]
    fn test_duplicate_deliveries_are_dropped() {
        let (mut search, endpoint) = channel(8);
        let report = PromisingScenario::new(partial(&[Some(1)]), 0, 0, 0);
        endpoint.outbound.send(report.clone()).unwrap();
        endpoint.outbound.send(report).unwrap();
        endpoint
            .outbound
            .send(PromisingScenario::new(partial(&[Some(2)]), 0, 1, 0))
            .unwrap();

        let reports = search.drain_scenarios();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].sequence(), 1);
    }

    #[test]
    fn test_blocked_emit_is_released_by_stop_request() {
        let (search, mut endpoint) = channel(1);
        let (stop, listener) = stop_signal();

        let worker = std::thread::spawn(move || {
            let mut handler = |_: SearchEvent| {};
            let first = endpoint
                .emit(partial(&[Some(1)]), 0, &mut handler, &listener)
                .unwrap();
            let second = endpoint
                .emit(partial(&[Some(2)]), 0, &mut handler, &listener)
                .unwrap();
            (first, second)
        });

        std::thread::sleep(Duration::from_millis(50));
        stop.request_stop();

        let (first, second) = worker.join().unwrap();
        assert_eq!(first, Flow::Continue);
        assert_eq!(second, Flow::Stop(StopReason::StopRequested));
        assert_eq!(search.pending_scenarios(), 1);
    }

    #[test]
    fn test_stop_token_read_before_the_flag_is_a_stop_request() {
        let (search, mut endpoint) = channel(1);
        let (stop, listener) = stop_signal();
        let mut handler = |_: SearchEvent| {};

        endpoint
            .emit(partial(&[Some(1)]), 0, &mut handler, &listener)
            .unwrap();
        // The owner's token is already queued, its flag store not yet visible.
        stop.tx.try_send(()).unwrap();

        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let worker = std::thread::spawn(move || {
            let mut handler = |_: SearchEvent| {};
            let flow = endpoint
                .emit(partial(&[Some(2)]), 0, &mut handler, &listener)
                .unwrap();
            let _ = done_tx.send(flow);
            listener
        });

        std::thread::sleep(Duration::from_millis(20));
        stop.flag.store(true, Ordering::Release);

        let flow = done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("emit stayed blocked after the stop request");
        assert_eq!(flow, Flow::Stop(StopReason::StopRequested));
        assert_eq!(search.pending_scenarios(), 1);

        let listener = worker.join().unwrap();
        assert!(listener.is_requested());
    }

    #[test]
    fn test_listener_remembers_a_consumed_token() {
        let (stop, listener) = stop_signal();
        stop.tx.try_send(()).unwrap();

        assert!(listener.is_requested());
        assert!(listener.is_requested());
        assert!(stop.is_requested());
    }

    #[test]
    fn test_blocked_emit_is_released_by_terminal_event() {
        let (mut search, mut endpoint) = channel(1);
        let (_stop, listener) = stop_signal();

        let worker = std::thread::spawn(move || {
            let mut handler = |_: SearchEvent| {};
            endpoint
                .emit(partial(&[Some(1)]), 0, &mut handler, &listener)
                .unwrap();
            let flow = endpoint
                .emit(partial(&[Some(2)]), 0, &mut handler, &listener)
                .unwrap();
            (flow, endpoint.emitted())
        });

        std::thread::sleep(Duration::from_millis(50));
        search.global_failure();

        let (flow, emitted) = worker.join().unwrap();
        assert_eq!(flow, Flow::Stop(StopReason::GlobalFailure));
        assert_eq!(emitted, 1);

        assert_eq!(search.next_scenario().map(|s| s.sequence()), Some(0));
        assert!(search.next_scenario().is_none());
    }

    #[test]
    fn test_dropped_search_handle_disconnects() {
        let (search, mut endpoint) = channel(1);
        let (_stop, listener) = stop_signal();
        let mut handler = |_: SearchEvent| {};

        search.choice_made(VarIndex::new(0), 1, 1);
        drop(search);

        let mut seen = 0;
        let mut counting = |_: SearchEvent| seen += 1;
        assert_eq!(
            endpoint.poll(&mut counting, &listener),
            Flow::Stop(StopReason::SearchDisconnected)
        );
        assert_eq!(seen, 1);
        assert!(
            endpoint
                .emit(partial(&[Some(1)]), 0, &mut handler, &listener)
                .is_err()
        );
    }

    #[test]
    fn test_dropped_stop_handle_counts_as_stop_request() {
        let (_search, mut endpoint) = channel(1);
        let (stop, listener) = stop_signal();
        let mut handler = |_: SearchEvent| {};

        assert_eq!(endpoint.poll(&mut handler, &listener), Flow::Continue);
        drop(stop);
        assert_eq!(
            endpoint.poll(&mut handler, &listener),
            Flow::Stop(StopReason::StopRequested)
        );
    }

    #[test]
    fn test_notify_reports_missing_worker() {
        let (search, endpoint) = channel(1);
        assert!(search.failure_at_node());
        drop(endpoint);
        assert!(!search.strategy_found());
    }
}
