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

//! Constraint violation scoring.
//!
//! The score of a candidate is the sum of the per-constraint penalties
//! returned by `Comparison::penalty`: `0` when a constraint holds, otherwise
//! the distance between its two sides (plus one for strict comparisons, a
//! flat `1` for disequalities). A score of `0` is the only fully satisfying
//! state, and a smaller score means a candidate closer to satisfying.
//!
//! All arithmetic is checked. Overflow is reported as a `SamplingFault`
//! rather than wrapped into a misleading score.

use crate::error::SamplingFault;
use scout_model::{
    constraint::Constraint, index::ConstraintIndex, instance::Instance, mirror::ModelMirror,
};

/// Evaluates candidates against a model.
///
/// Implementations must be pure: the same model and instance always give the
/// same result, and neither is mutated.
pub trait ViolationScorer {
    /// Returns the name of the scorer.
    fn name(&self) -> &str;

    /// Returns the violation score of `instance`.
    fn score(&self, model: &ModelMirror, instance: &Instance) -> Result<u64, SamplingFault>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstraintScorer;

impl ConstraintScorer {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// The penalty of a single constraint.
    #[inline]
    pub fn penalty(
        index: ConstraintIndex,
        constraint: &Constraint,
        values: &[i64],
    ) -> Result<u64, SamplingFault> {
        let (lhs, rhs) = constraint
            .sides(values)
            .ok_or(SamplingFault::Overflow { constraint: index })?;
        Ok(constraint.comparison().penalty(lhs, rhs))
    }

    /// The penalty of every constraint, in registration order.
    pub fn breakdown(
        &self,
        model: &ModelMirror,
        instance: &Instance,
    ) -> Result<Vec<u64>, SamplingFault> {
        Self::check_len(model, instance)?;
        model
            .constraints()
            .iter()
            .enumerate()
            .map(|(i, c)| Self::penalty(ConstraintIndex::new(i), c, instance.values()))
            .collect()
    }

    #[inline]
    fn check_len(model: &ModelMirror, instance: &Instance) -> Result<(), SamplingFault> {
        if instance.len() != model.num_variables() {
            return Err(SamplingFault::SizeMismatch {
                expected: model.num_variables(),
                actual: instance.len(),
            });
        }
        Ok(())
    }
}

impl ViolationScorer for ConstraintScorer {
    fn name(&self) -> &str {
        "ConstraintScorer"
    }

    fn score(&self, model: &ModelMirror, instance: &Instance) -> Result<u64, SamplingFault> {
        Self::check_len(model, instance)?;

        let values = instance.values();
        let mut total: u64 = 0;
        for (i, constraint) in model.constraints().iter().enumerate() {
            let index = ConstraintIndex::new(i);
            let penalty = Self::penalty(index, constraint, values)?;
            total = total
                .checked_add(penalty)
                .ok_or(SamplingFault::ScoreOverflow { constraint: index })?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use scout_model::{
        constraint::Comparison,
        variable::{Quantifier, VarType},
    };

    /// x + y <cmp> z and 2 * x * y <cmp> z.
    fn model(cmp: Comparison) -> ModelMirror {
        let mut m = ModelMirror::new();
        for name in ["x", "y", "z"] {
            m.register_variable(name, Quantifier::Exists, VarType::Int, i64::MIN, i64::MAX)
                .unwrap();
        }
        m.register_linear_constraint([(1, "x"), (1, "y")], cmp, "z")
            .unwrap();
        m.register_times_constraint(2, "x", "y", cmp, "z").unwrap();
        m.close().unwrap();
        m
    }

    #[test]
    fn test_satisfying_instance_scores_zero() {
        let m = model(Comparison::Eq);
        // x + y = 2 and 2 * x * y = 2
        assert_eq!(ConstraintScorer.score(&m, &Instance::new(vec![1, 1, 2])), Ok(0));
        // Moving z by one violates both constraints by one.
        assert_eq!(ConstraintScorer.score(&m, &Instance::new(vec![1, 1, 3])), Ok(2));
    }

    #[test]
    fn test_breakdown_and_total_agree() {
        let m = model(Comparison::Le);
        let instance = Instance::new(vec![3, 4, 10]);
        // 7 <= 10 holds, 24 <= 10 is off by 14
        assert_eq!(ConstraintScorer.breakdown(&m, &instance), Ok(vec![0, 14]));
        assert_eq!(ConstraintScorer.score(&m, &instance), Ok(14));
    }

    #[test]
    fn test_size_mismatch_is_a_fault() {
        let m = model(Comparison::Eq);
        assert_eq!(
            ConstraintScorer.score(&m, &Instance::new(vec![1, 2])),
            Err(SamplingFault::SizeMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_overflow_is_a_fault() {
        let m = model(Comparison::Eq);
        let instance = Instance::new(vec![i64::MAX, i64::MAX, 0]);
        assert_eq!(
            ConstraintScorer.score(&m, &instance),
            Err(SamplingFault::Overflow {
                constraint: ConstraintIndex::new(0)
            })
        );
    }

    #[test]
    fn test_total_overflow_is_a_fault() {
        let mut m = ModelMirror::new();
        for name in ["x", "y"] {
            m.register_variable(name, Quantifier::Exists, VarType::Int, i64::MIN, i64::MAX)
                .unwrap();
        }
        for _ in 0..3 {
            m.register_linear_constraint([(1, "x")], Comparison::Eq, "y")
                .unwrap();
        }
        m.close().unwrap();

        let instance = Instance::new(vec![i64::MAX, i64::MIN]);
        assert_eq!(
            ConstraintScorer.score(&m, &instance),
            Err(SamplingFault::ScoreOverflow {
                constraint: ConstraintIndex::new(1)
            })
        );
    }

    #[test]
    fn test_scoring_is_pure() {
        let m = model(Comparison::Gt);
        let instance = Instance::new(vec![1, 1, 5]);
        let before = instance.clone();
        let a = ConstraintScorer.score(&m, &instance);
        let b = ConstraintScorer.score(&m, &instance);
        assert_eq!(a, b);
        assert_eq!(instance, before);
    }

    proptest! {
        #[test]
        fn prop_zero_iff_all_constraints_hold(
            x in -1_000i64..1_000,
            y in -1_000i64..1_000,
            z in -4_000_000i64..4_000_000,
            cmp in prop::sample::select(vec![
                Comparison::Eq, Comparison::Ne, Comparison::Lt,
                Comparison::Le, Comparison::Gt, Comparison::Ge,
            ]),
        ) {
            let m = model(cmp);
            let score = ConstraintScorer.score(&m, &Instance::new(vec![x, y, z])).unwrap();
            let holds = cmp.holds(x + y, z) && cmp.holds(2 * x * y, z);
            prop_assert_eq!(score == 0, holds);
        }

        #[test]
        fn prop_moving_the_rhs_away_never_lowers_the_penalty(
            x in -1_000i64..1_000,
            y in -1_000i64..1_000,
            d in 0i64..10_000,
            extra in 1i64..10_000,
        ) {
            let m = model(Comparison::Eq);
            let lhs = x + y;
            let near = ConstraintScorer.breakdown(&m, &Instance::new(vec![x, y, lhs + d])).unwrap()[0];
            let far = ConstraintScorer.breakdown(&m, &Instance::new(vec![x, y, lhs + d + extra])).unwrap()[0];
            prop_assert!(far > near);
        }
    }
}
