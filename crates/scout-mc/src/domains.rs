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

//! Sampling domains narrowed by the exact search's branching.
//!
//! Every variable starts with its declared domain. `ChoiceMade` events are
//! recorded on a chronological choice stack; the current domain of a variable
//! is its declared domain intersected with its choice on the stack, if any.
//! A choice on a variable that is already on the stack means the exact search
//! backtracked to that decision, so that entry and everything above it is
//! discarded first. `FailureAtNode` discards the most recent choice.
//!
//! A shared scenario pins every assigned variable to its value until the next
//! choice or failure rebuilds the domains from the stack.

use scout_core::math::interval::ClosedInterval;
use scout_model::{index::VarIndex, instance::Scenario, mirror::ModelMirror};
use scout_search::event::SearchEvent;

/// One entry of the choice stack.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Choice {
    pub variable: VarIndex,
    pub domain: ClosedInterval<i64>,
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ∈ {}", self.variable, self.domain)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SamplingDomains {
    declared: Vec<ClosedInterval<i64>>,
    current: Vec<ClosedInterval<i64>>,
    choices: Vec<Choice>,
    pinned: Vec<bool>,
    num_pinned: usize,
}

impl SamplingDomains {
    /// Creates sampling domains equal to the declared domains of `mirror`.
    pub fn new(mirror: &ModelMirror) -> Self {
        Self::from_declared(mirror.domains().collect())
    }

    #[inline]
    pub fn from_declared(declared: Vec<ClosedInterval<i64>>) -> Self {
        Self {
            current: declared.clone(),
            pinned: vec![false; declared.len()],
            declared,
            choices: Vec::new(),
            num_pinned: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.declared.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    /// The domains the sampler currently draws from, in index order.
    #[inline]
    pub fn domains(&self) -> &[ClosedInterval<i64>] {
        &self.current
    }

    /// Returns the current sampling domain of `variable`.
    ///
    /// # Panics
    ///
    /// Panics if `variable` is out of bounds.
    #[inline]
    pub fn domain(&self, variable: VarIndex) -> ClosedInterval<i64> {
        let index = variable.get();
        debug_assert!(
            index < self.len(),
            "called `SamplingDomains::domain` with variable index out of bounds: the len is {} but the index is {}",
            self.len(),
            index
        );

        self.current[index]
    }

    /// The choice stack, oldest first.
    #[inline]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.choices.len()
    }

    /// Number of distinct variables pinned by shared scenarios since the
    /// domains were last rebuilt from the choice stack.
    #[inline]
    pub fn num_pinned(&self) -> usize {
        self.num_pinned
    }

    /// Applies a non-terminal search event. Terminal events are ignored.
    pub fn apply(&mut self, event: SearchEvent) {
        match event {
            SearchEvent::ChoiceMade { variable, min, max } => {
                self.choice_made(variable, min, max);
            }
            SearchEvent::FailureAtNode => {
                self.failure_at_node();
            }
            SearchEvent::ScenarioShared(scenario) => {
                self.share_scenario(&scenario);
            }
            SearchEvent::GlobalFailure | SearchEvent::StrategyFound => {}
        }
    }

    /// Records a branching decision. Returns `false` if the request was ignored
    /// because `variable` is unknown or `[min, max]` does not meet its declared domain.
    pub fn choice_made(&mut self, variable: VarIndex, min: i64, max: i64) -> bool {
        let Some(declared) = self.declared.get(variable.get()) else {
            tracing::warn!(%variable, min, max, "choice on unknown variable ignored");
            return false;
        };

        let Some(domain) =
            ClosedInterval::try_new(min, max).and_then(|requested| requested.intersection(declared))
        else {
            tracing::warn!(%variable, min, max, declared = %declared, "empty choice ignored");
            return false;
        };

        let choice = Choice { variable, domain };
        match self.choices.iter().position(|c| c.variable == variable) {
            Some(position) => {
                self.choices.truncate(position);
                self.choices.push(choice);
                self.rebuild();
            }
            None if self.num_pinned > 0 => {
                self.choices.push(choice);
                self.rebuild();
            }
            None => {
                self.choices.push(choice);
                self.current[variable.get()] = domain;
            }
        }

        tracing::trace!(%choice, depth = self.depth(), "choice recorded");
        true
    }

    /// Discards the most recent choice. Returns `false` if the stack was empty.
    pub fn failure_at_node(&mut self) -> bool {
        let popped = self.choices.pop();
        self.rebuild();
        popped.is_some()
    }

    /// Pins every assigned variable of `scenario` to its value.
    /// Returns the number of pinned variables.
    pub fn share_scenario(&mut self, scenario: &Scenario) -> usize {
        if scenario.len() > self.len() {
            tracing::warn!(
                scenario_len = scenario.len(),
                model_len = self.len(),
                "shared scenario is longer than the model, extra entries ignored"
            );
        }

        let mut pinned = 0;
        for (variable, value) in scenario.assigned() {
            let Some(declared) = self.declared.get(variable.get()) else {
                continue;
            };
            if !declared.contains(value) {
                tracing::warn!(%variable, value, declared = %declared, "shared value outside the declared domain ignored");
                continue;
            }
            self.current[variable.get()] = ClosedInterval::singleton(value);
            if !std::mem::replace(&mut self.pinned[variable.get()], true) {
                self.num_pinned += 1;
            }
            pinned += 1;
        }

        pinned
    }

    /// Drops every choice and pin.
    pub fn reset(&mut self) {
        self.choices.clear();
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.current.copy_from_slice(&self.declared);
        for choice in &self.choices {
            self.current[choice.variable.get()] = choice.domain;
        }
        self.pinned.fill(false);
        self.num_pinned = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains() -> SamplingDomains {
        SamplingDomains::from_declared(vec![
            ClosedInterval::new(1, 40),
            ClosedInterval::new(-1, 1),
            ClosedInterval::new(0, 10),
        ])
    }

    fn v(i: usize) -> VarIndex {
        VarIndex::new(i)
    }

    #[test]
    fn test_starts_at_declared_domains() {
        let d = domains();
        assert_eq!(d.len(), 3);
        assert_eq!(d.domain(v(0)), ClosedInterval::new(1, 40));
        assert_eq!(d.depth(), 0);
    }

    #[test]
    fn test_choice_narrows_to_intersection() {
        let mut d = domains();
        assert!(d.choice_made(v(0), 30, 60));
        assert_eq!(d.domain(v(0)), ClosedInterval::new(30, 40));
        assert_eq!(d.domain(v(1)), ClosedInterval::new(-1, 1));
    }

    #[test]
    fn test_invalid_choices_are_ignored() {
        let mut d = domains();
        assert!(!d.choice_made(v(0), 50, 60));
        assert!(!d.choice_made(v(0), 5, 4));
        assert!(!d.choice_made(v(7), 0, 0));
        assert_eq!(d.depth(), 0);
        assert_eq!(d.domains(), domains().domains());
    }

    #[test]
    fn test_rechoosing_a_variable_backtracks_the_stack() {
        let mut d = domains();
        d.choice_made(v(0), 10, 10);
        d.choice_made(v(1), 1, 1);
        d.choice_made(v(2), 3, 4);
        assert_eq!(d.depth(), 3);

        // Back to the first decision with a different branch.
        d.choice_made(v(0), 11, 40);
        assert_eq!(d.depth(), 1);
        assert_eq!(d.domain(v(0)), ClosedInterval::new(11, 40));
        assert_eq!(d.domain(v(1)), ClosedInterval::new(-1, 1));
        assert_eq!(d.domain(v(2)), ClosedInterval::new(0, 10));
    }

    #[test]
    fn test_failure_pops_the_latest_choice() {
        let mut d = domains();
        d.choice_made(v(0), 10, 10);
        d.choice_made(v(1), -1, -1);

        assert!(d.failure_at_node());
        assert_eq!(d.depth(), 1);
        assert_eq!(d.domain(v(0)), ClosedInterval::singleton(10));
        assert_eq!(d.domain(v(1)), ClosedInterval::new(-1, 1));

        assert!(d.failure_at_node());
        assert!(!d.failure_at_node());
        assert_eq!(d.domains(), domains().domains());
    }

    #[test]
    fn test_shared_scenario_pins_until_rebuild() {
        let mut d = domains();
        let scenario = Scenario::new(vec![Some(7), None, Some(99)]);

        assert_eq!(d.share_scenario(&scenario), 1);
        assert_eq!(d.domain(v(0)), ClosedInterval::singleton(7));
        assert_eq!(d.domain(v(2)), ClosedInterval::new(0, 10));
        assert_eq!(d.num_pinned(), 1);

        d.choice_made(v(1), 0, 1);
        assert_eq!(d.num_pinned(), 0);
        assert_eq!(d.domain(v(0)), ClosedInterval::new(1, 40));
        assert_eq!(d.domain(v(1)), ClosedInterval::new(0, 1));
    }

    #[test]
    fn test_pins_from_several_scenarios_are_counted_once() {
        let mut d = domains();

        assert_eq!(d.share_scenario(&Scenario::new(vec![Some(3), None, None])), 1);
        assert_eq!(d.share_scenario(&Scenario::new(vec![None, Some(0), Some(4)])), 2);
        assert_eq!(d.num_pinned(), 3);

        // Re-pinning an already pinned variable moves it but adds no pin.
        assert_eq!(d.share_scenario(&Scenario::new(vec![Some(5)])), 1);
        assert_eq!(d.num_pinned(), 3);
        assert_eq!(d.domain(v(0)), ClosedInterval::singleton(5));
        assert_eq!(d.domain(v(1)), ClosedInterval::singleton(0));

        assert!(!d.failure_at_node());
        assert_eq!(d.num_pinned(), 0);
        assert_eq!(d.domains(), domains().domains());
    }

    #[test]
    fn test_apply_dispatches_events() {
        let mut d = domains();
        d.apply(SearchEvent::ChoiceMade {
            variable: v(2),
            min: 5,
            max: 5,
        });
        d.apply(SearchEvent::StrategyFound);
        assert_eq!(d.domain(v(2)), ClosedInterval::singleton(5));

        d.apply(SearchEvent::ScenarioShared(Scenario::new(vec![Some(2)])));
        assert_eq!(d.domain(v(0)), ClosedInterval::singleton(2));

        d.apply(SearchEvent::FailureAtNode);
        assert_eq!(d.depth(), 0);
        assert_eq!(d.domains(), domains().domains());
    }

    #[test]
    fn test_reset() {
        let mut d = domains();
        d.choice_made(v(0), 1, 1);
        d.share_scenario(&Scenario::new(vec![None, Some(0)]));
        d.reset();
        assert_eq!(d.depth(), 0);
        assert_eq!(d.num_pinned(), 0);
        assert_eq!(d.domains(), domains().domains());
    }
}
