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

//! Candidate assignments.
//!
//! An `Instance` holds one value per registered variable, in index order.
//! A `Scenario` is the same layout with room for unassigned entries; it is
//! what travels between the exact search and the sampling worker.

use crate::index::VarIndex;

/// A complete candidate assignment, one value per variable in index order.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Instance {
    values: Vec<i64>,
}

impl Instance {
    #[inline]
    pub fn new(values: Vec<i64>) -> Self {
        Self { values }
    }

    /// Creates an instance of `len` zeros, typically reused as a sampling buffer.
    #[inline]
    pub fn zeroed(len: usize) -> Self {
        Self {
            values: vec![0; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value of `variable`.
    ///
    /// # Panics
    ///
    /// Panics if `variable` is out of bounds.
    #[inline]
    pub fn get(&self, variable: VarIndex) -> i64 {
        let index = variable.get();
        debug_assert!(
            index < self.len(),
            "called `Instance::get` with variable index out of bounds: the len is {} but the index is {}",
            self.len(),
            index
        );

        self.values[index]
    }

    /// Sets the value of `variable`.
    ///
    /// # Panics
    ///
    /// Panics if `variable` is out of bounds.
    #[inline]
    pub fn set(&mut self, variable: VarIndex, value: i64) {
        let index = variable.get();
        debug_assert!(
            index < self.len(),
            "called `Instance::set` with variable index out of bounds: the len is {} but the index is {}",
            self.len(),
            index
        );

        self.values[index] = value;
    }

    #[inline]
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    #[inline]
    pub fn values_mut(&mut self) -> &mut [i64] {
        &mut self.values
    }

    /// Resizes the instance to `len` values, filling new slots with zero.
    #[inline]
    pub fn resize(&mut self, len: usize) {
        self.values.resize(len, 0);
    }
}

impl From<Vec<i64>> for Instance {
    fn from(values: Vec<i64>) -> Self {
        Self::new(values)
    }
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }
}

/// A possibly partial assignment; `None` marks an unassigned variable.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Scenario {
    values: Vec<Option<i64>>,
}

impl Scenario {
    #[inline]
    pub fn new(values: Vec<Option<i64>>) -> Self {
        Self { values }
    }

    /// Creates a scenario of `len` unassigned entries.
    #[inline]
    pub fn unassigned(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value of `variable`, `None` if it is unassigned or out of bounds.
    #[inline]
    pub fn get(&self, variable: VarIndex) -> Option<i64> {
        self.values.get(variable.get()).copied().flatten()
    }

    /// Assigns `variable`.
    ///
    /// # Panics
    ///
    /// Panics if `variable` is out of bounds.
    #[inline]
    pub fn assign(&mut self, variable: VarIndex, value: i64) {
        self.values[variable.get()] = Some(value);
    }

    #[inline]
    pub fn values(&self) -> &[Option<i64>] {
        &self.values
    }

    /// Returns `true` if every entry is assigned.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    #[inline]
    pub fn num_assigned(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Iterates over the assigned entries as `(variable, value)` pairs.
    pub fn assigned(&self) -> impl Iterator<Item = (VarIndex, i64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|value| (VarIndex::new(i), value)))
    }

    /// Converts a complete scenario into an instance.
    #[inline]
    pub fn to_instance(&self) -> Option<Instance> {
        self.values
            .iter()
            .copied()
            .collect::<Option<Vec<i64>>>()
            .map(Instance::new)
    }
}

impl From<&Instance> for Scenario {
    fn from(instance: &Instance) -> Self {
        Self {
            values: instance.values().iter().copied().map(Some).collect(),
        }
    }
}

impl From<Instance> for Scenario {
    fn from(instance: Instance) -> Self {
        Self::from(&instance)
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match v {
                Some(value) => write!(f, "{}", value)?,
                None => write!(f, "_")?,
            }
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_get_set() {
        let mut inst = Instance::zeroed(3);
        inst.set(VarIndex::new(1), -7);
        assert_eq!(inst.get(VarIndex::new(1)), -7);
        assert_eq!(inst.values(), &[0, -7, 0]);
        assert_eq!(format!("{}", inst), "(0, -7, 0)");
    }

    #[test]
    fn test_scenario_from_instance_is_complete() {
        let inst = Instance::new(vec![1, 2, 3]);
        let scenario = Scenario::from(&inst);
        assert!(scenario.is_complete());
        assert_eq!(scenario.to_instance(), Some(inst));
    }

    #[test]
    fn test_partial_scenario() {
        let mut scenario = Scenario::unassigned(4);
        scenario.assign(VarIndex::new(2), 9);
        assert!(!scenario.is_complete());
        assert_eq!(scenario.num_assigned(), 1);
        assert_eq!(scenario.get(VarIndex::new(2)), Some(9));
        assert_eq!(scenario.get(VarIndex::new(0)), None);
        assert_eq!(scenario.get(VarIndex::new(99)), None);
        assert_eq!(scenario.to_instance(), None);
        assert_eq!(
            scenario.assigned().collect::<Vec<_>>(),
            vec![(VarIndex::new(2), 9)]
        );
        assert_eq!(format!("{}", scenario), "(_, _, 9, _)");
    }
}
