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

use crate::index::VarIndex;
use scout_core::math::interval::ClosedInterval;

/// The quantifier role of a decision variable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Quantifier {
    /// The variable is chosen by the solver (`∃`).
    Exists,
    /// The variable is chosen by the adversary (`∀`).
    Forall,
}

impl std::fmt::Display for Quantifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quantifier::Exists => write!(f, "exists"),
            Quantifier::Forall => write!(f, "forall"),
        }
    }
}

/// The scalar type of a variable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum VarType {
    #[default]
    Int,
    /// Boolean variables are integers restricted to `[0, 1]`.
    Bool,
}

impl VarType {
    /// The widest domain a variable of this type may declare, if restricted.
    #[inline]
    pub fn admissible_domain(&self) -> Option<ClosedInterval<i64>> {
        match self {
            VarType::Int => None,
            VarType::Bool => Some(ClosedInterval::new(0, 1)),
        }
    }
}

impl std::fmt::Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarType::Int => write!(f, "int"),
            VarType::Bool => write!(f, "bool"),
        }
    }
}

/// Whether a variable is branched upon by the exact search or derived from others.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum VariableKind {
    /// A quantified variable of the binder.
    Decision(Quantifier),
    /// A helper quantity introduced by the model builder, e.g. the result of a product.
    Auxiliary,
}

/// A registered variable of the mirrored model.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Variable {
    name: String,
    index: VarIndex,
    kind: VariableKind,
    var_type: VarType,
    domain: ClosedInterval<i64>,
}

impl Variable {
    #[inline]
    pub(crate) fn new(
        name: String,
        index: VarIndex,
        kind: VariableKind,
        var_type: VarType,
        domain: ClosedInterval<i64>,
    ) -> Self {
        Self {
            name,
            index,
            kind,
            var_type,
            domain,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dense index; equals the registration order.
    #[inline]
    pub fn index(&self) -> VarIndex {
        self.index
    }

    #[inline]
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// Returns the quantifier of a decision variable, `None` for auxiliaries.
    #[inline]
    pub fn quantifier(&self) -> Option<Quantifier> {
        match self.kind {
            VariableKind::Decision(q) => Some(q),
            VariableKind::Auxiliary => None,
        }
    }

    #[inline]
    pub fn is_auxiliary(&self) -> bool {
        matches!(self.kind, VariableKind::Auxiliary)
    }

    #[inline]
    pub fn var_type(&self) -> VarType {
        self.var_type
    }

    /// The declared domain. It never changes after registration.
    #[inline]
    pub fn domain(&self) -> ClosedInterval<i64> {
        self.domain
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            VariableKind::Decision(q) => write!(
                f,
                "{} {} {}: {} ∈ {}",
                self.index, q, self.var_type, self.name, self.domain
            ),
            VariableKind::Auxiliary => write!(
                f,
                "{} aux {}: {} ∈ {}",
                self.index, self.var_type, self.name, self.domain
            ),
        }
    }
}
