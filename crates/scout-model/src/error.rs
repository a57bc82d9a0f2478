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

use scout_core::math::interval::ClosedInterval;

use crate::variable::VarType;

/// Errors raised while building or querying the model mirror.
///
/// These are caller mistakes; every one of them is reported synchronously
/// by the call that caused it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A variable with this name is already registered.
    #[error("variable `{0}` is already registered")]
    DuplicateName(String),

    /// A constraint references a name that was never registered.
    #[error("constraint references unknown variable `{0}`")]
    UnknownVariable(String),

    /// A registration was attempted after the model was closed.
    #[error("the model is closed; no further registration is allowed")]
    ModelClosed,

    /// `close` was called on an already closed model.
    #[error("the model is already closed")]
    AlreadyClosed,

    /// The model must be closed before sampling can start.
    #[error("the model is not closed yet")]
    NotClosed,

    /// A lookup for a name that was never registered.
    #[error("no variable named `{0}`")]
    NotFound(String),

    /// The declared bounds do not form a non-empty domain admissible for the type.
    #[error("invalid domain [{min}, {max}] for {var_type} variable `{name}`")]
    InvalidDomain {
        name: String,
        var_type: VarType,
        min: i64,
        max: i64,
    },
}

impl ModelError {
    #[inline]
    pub(crate) fn invalid_domain(name: &str, var_type: VarType, min: i64, max: i64) -> Self {
        ModelError::InvalidDomain {
            name: name.to_string(),
            var_type,
            min,
            max,
        }
    }

    /// Returns `true` for errors caused by the model's phase rather than its content.
    #[inline]
    pub fn is_phase_error(&self) -> bool {
        matches!(
            self,
            ModelError::ModelClosed | ModelError::AlreadyClosed | ModelError::NotClosed
        )
    }
}

/// Validates the declared bounds of a variable of type `var_type`.
pub(crate) fn validate_domain(
    name: &str,
    var_type: VarType,
    min: i64,
    max: i64,
) -> Result<ClosedInterval<i64>, ModelError> {
    let domain = ClosedInterval::try_new(min, max)
        .ok_or_else(|| ModelError::invalid_domain(name, var_type, min, max))?;

    match var_type.admissible_domain() {
        Some(admissible) if !domain.is_subset_of(&admissible) => {
            Err(ModelError::invalid_domain(name, var_type, min, max))
        }
        _ => Ok(domain),
    }
}
