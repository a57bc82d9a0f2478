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

//! # Model Mirror
//!
//! A registry of the variables and constraints of a quantified problem,
//! filled by the modeling front end while the exact solver states its model
//! and frozen by `close`. While `Building`, names are resolved to dense
//! indices as they arrive; once `Closed`, the structure never changes again
//! and the sampling worker reads it through a shared reference without any
//! synchronization.
//!
//! ## Phases
//!
//! | Phase | Registration | `close` | Sampling |
//! | :--- | :--- | :--- | :--- |
//! | `Building` | allowed | `Building -> Closed` | refused (`NotClosed`) |
//! | `Closed` | `ModelClosed` | `AlreadyClosed` | allowed |
//!
//! ## Usage
//!
//! ```rust
//! use scout_model::constraint::Comparison;
//! use scout_model::mirror::ModelMirror;
//! use scout_model::variable::{Quantifier, VarType};
//!
//! let mut mirror = ModelMirror::new();
//! let x = mirror.register_variable("x", Quantifier::Exists, VarType::Int, 0, 9).unwrap();
//! let y = mirror.register_aux_variable("y", VarType::Int, 0, 18).unwrap();
//! mirror.register_linear_constraint([(2, "x")], Comparison::Eq, "y").unwrap();
//! mirror.close().unwrap();
//!
//! assert_eq!(mirror.lookup_index("y"), Ok(y));
//! assert_eq!(x.get(), 0);
//! ```

use crate::{
    constraint::{Comparison, Constraint, LinearConstraint, Term, TimesConstraint},
    error::{ModelError, validate_domain},
    index::{ConstraintIndex, VarIndex},
    variable::{Quantifier, VarType, Variable, VariableKind},
};
use rustc_hash::FxHashMap;
use scout_core::math::interval::ClosedInterval;
use tracing::debug;

/// The lifecycle phase of a `ModelMirror`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ModelPhase {
    #[default]
    Building,
    Closed,
}

impl std::fmt::Display for ModelPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelPhase::Building => write!(f, "Building"),
            ModelPhase::Closed => write!(f, "Closed"),
        }
    }
}

/// The mirrored problem model.
#[derive(Clone, Debug, Default)]
pub struct ModelMirror {
    phase: ModelPhase,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    names: FxHashMap<String, VarIndex>,
    num_aux_variables: usize,
}

impl ModelMirror {
    /// Creates an empty mirror in the `Building` phase.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn phase(&self) -> ModelPhase {
        self.phase
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.phase == ModelPhase::Closed
    }

    /// Registers a quantified decision variable and returns its dense index.
    ///
    /// # Errors
    ///
    /// - `ModelClosed` if the mirror is closed.
    /// - `InvalidDomain` if `min > max` or the bounds are not admissible for `var_type`.
    /// - `DuplicateName` if `name` is already registered, whatever its role.
    pub fn register_variable<S>(
        &mut self,
        name: S,
        quantifier: Quantifier,
        var_type: VarType,
        min: i64,
        max: i64,
    ) -> Result<VarIndex, ModelError>
    where
        S: Into<String>,
    {
        self.register(
            name.into(),
            VariableKind::Decision(quantifier),
            var_type,
            min,
            max,
        )
    }

    /// Registers an auxiliary variable. It shares the index space of
    /// `register_variable`.
    ///
    /// # Errors
    ///
    /// Same as `register_variable`.
    pub fn register_aux_variable<S>(
        &mut self,
        name: S,
        var_type: VarType,
        min: i64,
        max: i64,
    ) -> Result<VarIndex, ModelError>
    where
        S: Into<String>,
    {
        let index = self.register(name.into(), VariableKind::Auxiliary, var_type, min, max)?;
        self.num_aux_variables += 1;
        Ok(index)
    }

    fn register(
        &mut self,
        name: String,
        kind: VariableKind,
        var_type: VarType,
        min: i64,
        max: i64,
    ) -> Result<VarIndex, ModelError> {
        self.ensure_building()?;
        let domain = validate_domain(&name, var_type, min, max)?;
        if self.names.contains_key(&name) {
            return Err(ModelError::DuplicateName(name));
        }

        let index = VarIndex::new(self.variables.len());
        debug!(%index, name = %name, ?kind, %domain, "registered variable");

        self.names.insert(name.clone(), index);
        self.variables
            .push(Variable::new(name, index, kind, var_type, domain));
        Ok(index)
    }

    /// Registers `Σ coefficient_i * term_i <cmp> rhs`.
    ///
    /// # Errors
    ///
    /// - `ModelClosed` if the mirror is closed.
    /// - `UnknownVariable` if a term or `rhs` names an unregistered variable.
    pub fn register_linear_constraint<I, S>(
        &mut self,
        terms: I,
        comparison: Comparison,
        rhs: &str,
    ) -> Result<ConstraintIndex, ModelError>
    where
        I: IntoIterator<Item = (i64, S)>,
        S: AsRef<str>,
    {
        self.ensure_building()?;
        let terms = terms
            .into_iter()
            .map(|(coefficient, name)| Ok(Term::new(coefficient, self.resolve(name.as_ref())?)))
            .collect::<Result<Vec<_>, ModelError>>()?;
        let rhs = self.resolve(rhs)?;

        Ok(self.post(LinearConstraint::new(terms, comparison, rhs).into()))
    }

    /// Registers `factor * left * right <cmp> result`.
    ///
    /// # Errors
    ///
    /// - `ModelClosed` if the mirror is closed.
    /// - `UnknownVariable` if any of the three names is unregistered.
    pub fn register_times_constraint(
        &mut self,
        factor: i64,
        left: &str,
        right: &str,
        comparison: Comparison,
        result: &str,
    ) -> Result<ConstraintIndex, ModelError> {
        self.ensure_building()?;
        let left = self.resolve(left)?;
        let right = self.resolve(right)?;
        let result = self.resolve(result)?;

        Ok(self.post(TimesConstraint::new(factor, left, right, comparison, result).into()))
    }

    fn post(&mut self, constraint: Constraint) -> ConstraintIndex {
        let index = ConstraintIndex::new(self.constraints.len());
        debug!(%index, constraint = %constraint, "registered constraint");
        self.constraints.push(constraint);
        index
    }

    /// Freezes the mirror.
    ///
    /// # Errors
    ///
    /// `AlreadyClosed` if the mirror was closed before.
    pub fn close(&mut self) -> Result<(), ModelError> {
        if self.is_closed() {
            return Err(ModelError::AlreadyClosed);
        }

        self.phase = ModelPhase::Closed;
        debug!(
            variables = self.num_variables(),
            aux_variables = self.num_aux_variables,
            constraints = self.num_constraints(),
            "model closed"
        );
        Ok(())
    }

    /// Returns the index registered for `name`.
    ///
    /// # Errors
    ///
    /// `NotFound` if no variable carries that name.
    #[inline]
    pub fn lookup_index(&self, name: &str) -> Result<VarIndex, ModelError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::NotFound(name.to_string()))
    }

    #[inline]
    fn resolve(&self, name: &str) -> Result<VarIndex, ModelError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownVariable(name.to_string()))
    }

    #[inline]
    fn ensure_building(&self) -> Result<(), ModelError> {
        if self.is_closed() {
            Err(ModelError::ModelClosed)
        } else {
            Ok(())
        }
    }

    /// Returns all variables in index order.
    #[inline]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Returns the variable at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in `0..num_variables()`.
    #[inline]
    pub fn variable(&self, index: VarIndex) -> &Variable {
        let i = index.get();
        debug_assert!(
            i < self.num_variables(),
            "called `ModelMirror::variable` with variable index out of bounds: the len is {} but the index is {}",
            self.num_variables(),
            i
        );

        &self.variables[i]
    }

    /// Returns the variable at `index`, or `None` if it is out of bounds.
    #[inline]
    pub fn get_variable(&self, index: VarIndex) -> Option<&Variable> {
        self.variables.get(index.get())
    }

    /// Returns all constraints in registration order.
    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Number of variables, decision and auxiliary.
    #[inline]
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    #[inline]
    pub fn num_decision_variables(&self) -> usize {
        self.variables.len() - self.num_aux_variables
    }

    #[inline]
    pub fn num_aux_variables(&self) -> usize {
        self.num_aux_variables
    }

    #[inline]
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Iterates over the declared domains in index order.
    #[inline]
    pub fn domains(&self) -> impl ExactSizeIterator<Item = ClosedInterval<i64>> + '_ {
        self.variables.iter().map(Variable::domain)
    }

    /// Returns `log10` of the number of distinct instances the sampler can draw.
    pub fn search_space_log10(&self) -> f64 {
        self.domains()
            .map(|d| match d.cardinality() {
                Some(n) => (n as f64).log10(),
                // Wider than u64: at least 2^64 values.
                None => 64.0 * std::f64::consts::LOG10_2,
            })
            .sum()
    }
}

impl std::fmt::Display for ModelMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ModelMirror ({})", self.phase)?;
        for v in &self.variables {
            writeln!(f, "   {}", v)?;
        }
        for (i, c) in self.constraints.iter().enumerate() {
            writeln!(f, "   {}: {}", ConstraintIndex::new(i), c)?;
        }
        Ok(())
    }
}
