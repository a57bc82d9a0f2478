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

//! Constraint kinds of the mirrored model.
//!
//! Two relations are mirrored: linear sums `Σ c_i * x_i <cmp> y` and scaled
//! products `n * x * y <cmp> z`. Each is a variant of `Constraint` carrying
//! only the fields it needs. Evaluation helpers use checked arithmetic and
//! report overflow as `None`; the caller decides how to treat an unscorable
//! candidate.
//!
//! ## Penalties
//!
//! `Comparison::penalty` measures how far `lhs <cmp> rhs` is from holding:
//!
//! | Operator | Holds when | Penalty when violated |
//! | :--- | :--- | :--- |
//! | `==` | `lhs == rhs` | `|lhs - rhs|` |
//! | `!=` | `lhs != rhs` | `1` |
//! | `<`  | `lhs < rhs`  | `lhs - rhs + 1` |
//! | `<=` | `lhs <= rhs` | `lhs - rhs` |
//! | `>`  | `lhs > rhs`  | `rhs - lhs + 1` |
//! | `>=` | `lhs >= rhs` | `rhs - lhs` |
//!
//! The penalty is zero exactly when the comparison holds and grows with the
//! distance between both sides. Strict operators add one so that the
//! boundary case `lhs == rhs` is never free.

use crate::index::VarIndex;

/// A comparison operator `lhs <cmp> rhs`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    /// Returns `true` if `lhs <cmp> rhs` holds.
    #[inline]
    pub fn holds(&self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparison::Eq => lhs == rhs,
            Comparison::Ne => lhs != rhs,
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
        }
    }

    /// Returns the violation penalty of `lhs <cmp> rhs` (zero iff it holds).
    ///
    /// The difference of two `i64` always fits a `u64`; only the `+ 1` of the
    /// strict operators can exceed it, in which case the penalty saturates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use scout_model::constraint::Comparison;
    ///
    /// assert_eq!(Comparison::Eq.penalty(0, 5), 5);
    /// assert_eq!(Comparison::Eq.penalty(5, 5), 0);
    /// assert_eq!(Comparison::Lt.penalty(5, 5), 1);
    /// assert_eq!(Comparison::Ne.penalty(3, 3), 1);
    /// ```
    #[inline]
    pub fn penalty(&self, lhs: i64, rhs: i64) -> u64 {
        if self.holds(lhs, rhs) {
            return 0;
        }

        let distance = lhs.abs_diff(rhs);
        match self {
            Comparison::Eq | Comparison::Le | Comparison::Ge => distance,
            Comparison::Lt | Comparison::Gt => distance.saturating_add(1),
            Comparison::Ne => 1,
        }
    }

    /// The operator symbol.
    #[inline]
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One `coefficient * variable` monomial of a linear sum.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Term {
    pub coefficient: i64,
    pub variable: VarIndex,
}

impl Term {
    #[inline]
    pub fn new(coefficient: i64, variable: VarIndex) -> Self {
        Self {
            coefficient,
            variable,
        }
    }
}

/// `Σ coefficient_i * value(variable_i) <cmp> value(rhs)`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LinearConstraint {
    terms: Vec<Term>,
    comparison: Comparison,
    rhs: VarIndex,
}

impl LinearConstraint {
    #[inline]
    pub fn new(terms: Vec<Term>, comparison: Comparison, rhs: VarIndex) -> Self {
        Self {
            terms,
            comparison,
            rhs,
        }
    }

    #[inline]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    #[inline]
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    #[inline]
    pub fn rhs(&self) -> VarIndex {
        self.rhs
    }

    /// Computes `Σ coefficient_i * values[variable_i]`, or `None` on overflow.
    ///
    /// # Panics
    ///
    /// Panics if a referenced variable is out of bounds of `values`.
    #[inline]
    pub fn lhs_value(&self, values: &[i64]) -> Option<i64> {
        self.terms.iter().try_fold(0i64, |acc, term| {
            term.coefficient
                .checked_mul(values[term.variable.get()])
                .and_then(|product| acc.checked_add(product))
        })
    }
}

/// `factor * value(left) * value(right) <cmp> value(result)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TimesConstraint {
    factor: i64,
    left: VarIndex,
    right: VarIndex,
    comparison: Comparison,
    result: VarIndex,
}

impl TimesConstraint {
    #[inline]
    pub fn new(
        factor: i64,
        left: VarIndex,
        right: VarIndex,
        comparison: Comparison,
        result: VarIndex,
    ) -> Self {
        Self {
            factor,
            left,
            right,
            comparison,
            result,
        }
    }

    #[inline]
    pub fn factor(&self) -> i64 {
        self.factor
    }

    #[inline]
    pub fn left(&self) -> VarIndex {
        self.left
    }

    #[inline]
    pub fn right(&self) -> VarIndex {
        self.right
    }

    #[inline]
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    #[inline]
    pub fn result(&self) -> VarIndex {
        self.result
    }

    /// Computes `factor * values[left] * values[right]`, or `None` on overflow.
    ///
    /// # Panics
    ///
    /// Panics if a referenced variable is out of bounds of `values`.
    #[inline]
    pub fn lhs_value(&self, values: &[i64]) -> Option<i64> {
        self.factor
            .checked_mul(values[self.left.get()])?
            .checked_mul(values[self.right.get()])
    }
}

/// A mirrored constraint.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Constraint {
    Linear(LinearConstraint),
    Times(TimesConstraint),
}

impl Constraint {
    #[inline]
    pub fn comparison(&self) -> Comparison {
        match self {
            Constraint::Linear(c) => c.comparison(),
            Constraint::Times(c) => c.comparison(),
        }
    }

    /// Evaluates both sides against `values`, returning `(lhs, rhs)`,
    /// or `None` if the left-hand side overflows.
    ///
    /// # Panics
    ///
    /// Panics if a referenced variable is out of bounds of `values`.
    #[inline]
    pub fn sides(&self, values: &[i64]) -> Option<(i64, i64)> {
        match self {
            Constraint::Linear(c) => Some((c.lhs_value(values)?, values[c.rhs().get()])),
            Constraint::Times(c) => Some((c.lhs_value(values)?, values[c.result().get()])),
        }
    }

    /// Returns the largest variable index referenced by this constraint.
    pub fn max_variable(&self) -> Option<VarIndex> {
        match self {
            Constraint::Linear(c) => c
                .terms()
                .iter()
                .map(|t| t.variable)
                .chain(std::iter::once(c.rhs()))
                .max(),
            Constraint::Times(c) => [c.left(), c.right(), c.result()].into_iter().max(),
        }
    }
}

impl From<LinearConstraint> for Constraint {
    fn from(c: LinearConstraint) -> Self {
        Constraint::Linear(c)
    }
}

impl From<TimesConstraint> for Constraint {
    fn from(c: TimesConstraint) -> Self {
        Constraint::Times(c)
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Linear(c) => {
                for (i, term) in c.terms().iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{}*x{}", term.coefficient, term.variable.get())?;
                }
                if c.terms().is_empty() {
                    write!(f, "0")?;
                }
                write!(f, " {} x{}", c.comparison(), c.rhs().get())
            }
            Constraint::Times(c) => write!(
                f,
                "{}*x{}*x{} {} x{}",
                c.factor(),
                c.left().get(),
                c.right().get(),
                c.comparison(),
                c.result().get()
            ),
        }
    }
}
