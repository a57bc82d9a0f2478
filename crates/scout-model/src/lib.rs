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

//! # Scout Model
//!
//! The problem mirror the sampling worker reads while an exact quantified
//! search runs next to it. The modeling front end registers variables and
//! constraints by name, in declaration order; once the mirror is closed it is
//! frozen and can be shared across threads without any locking.
//!
//! ## Modules
//!
//! - `index`: typed indices for variables (`VarIndex`) and constraints
//!   (`ConstraintIndex`). Decision and auxiliary variables share one flat
//!   index space so every value of an instance is addressed by one index.
//! - `variable`: quantifier roles, scalar types and the `Variable` record.
//! - `constraint`: comparison operators with their violation penalties,
//!   `LinearConstraint`, `TimesConstraint` and the tagged `Constraint`.
//! - `instance`: complete candidate assignments (`Instance`) and partial
//!   snapshots with unassigned entries (`Scenario`).
//! - `mirror`: the write-once-then-frozen `ModelMirror` registry.
//! - `error`: `ModelError`, surfaced synchronously to the registering caller.

pub mod constraint;
pub mod error;
pub mod index;
pub mod instance;
pub mod mirror;
pub mod variable;
