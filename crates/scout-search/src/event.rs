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

use scout_model::{index::VarIndex, instance::Scenario};

/// An event emitted by the exact search while it explores.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SearchEvent {
    /// The search branched on `variable`, restricting it to `[min, max]`.
    ChoiceMade {
        variable: VarIndex,
        min: i64,
        max: i64,
    },
    /// The current branch failed.
    FailureAtNode,
    /// The problem is proved infeasible. Terminal.
    GlobalFailure,
    /// A winning strategy was found. Terminal.
    StrategyFound,
    /// The search shares its current partial assignment.
    ScenarioShared(Scenario),
}

impl SearchEvent {
    /// Returns `true` for events after which the worker must stop.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchEvent::GlobalFailure | SearchEvent::StrategyFound)
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            SearchEvent::ChoiceMade { .. } => "ChoiceMade",
            SearchEvent::FailureAtNode => "FailureAtNode",
            SearchEvent::GlobalFailure => "GlobalFailure",
            SearchEvent::StrategyFound => "StrategyFound",
            SearchEvent::ScenarioShared(_) => "ScenarioShared",
        }
    }
}

impl std::fmt::Display for SearchEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchEvent::ChoiceMade { variable, min, max } => {
                write!(f, "ChoiceMade({} ∈ [{}, {}])", variable, min, max)
            }
            SearchEvent::ScenarioShared(s) => write!(f, "ScenarioShared{}", s),
            other => f.write_str(other.name()),
        }
    }
}

/// Why the worker side of the bridge stopped listening.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum StopReason {
    /// The exact search proved the problem infeasible.
    GlobalFailure,
    /// The exact search found a winning strategy.
    StrategyFound,
    /// The owner of the worker requested a stop.
    StopRequested,
    /// The exact search dropped its side of the bridge.
    SearchDisconnected,
}

impl StopReason {
    /// Returns `true` if the stop was caused by a terminal search event.
    #[inline]
    pub fn is_terminal_event(&self) -> bool {
        matches!(self, StopReason::GlobalFailure | StopReason::StrategyFound)
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::GlobalFailure => write!(f, "global failure"),
            StopReason::StrategyFound => write!(f, "strategy found"),
            StopReason::StopRequested => write!(f, "stop requested"),
            StopReason::SearchDisconnected => write!(f, "search disconnected"),
        }
    }
}

/// A scenario reported by the worker to the exact search.
///
/// Ownership of the scenario moves to the receiver. `sequence` is strictly
/// increasing per sender, so a receiver can discard repeated deliveries.
/// `observed_events` counts the inbound events the worker had consumed when
/// it emitted the report.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PromisingScenario {
    scenario: Scenario,
    score: u64,
    sequence: u64,
    observed_events: u64,
}

impl PromisingScenario {
    #[inline]
    pub fn new(scenario: Scenario, score: u64, sequence: u64, observed_events: u64) -> Self {
        Self {
            scenario,
            score,
            sequence,
            observed_events,
        }
    }

    #[inline]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    #[inline]
    pub fn into_scenario(self) -> Scenario {
        self.scenario
    }

    /// The violation score of the reported assignment; `0` means fully satisfying.
    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[inline]
    pub fn is_satisfying(&self) -> bool {
        self.score == 0
    }

    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[inline]
    pub fn observed_events(&self) -> u64 {
        self.observed_events
    }
}

impl std::fmt::Display for PromisingScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PromisingScenario(#{}, score: {}, {})",
            self.sequence, self.score, self.scenario
        )
    }
}
