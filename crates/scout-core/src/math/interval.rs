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

use num_traits::PrimInt;
use std::iter::FusedIterator;

/// An inclusive integer interval `[min, max]`.
///
/// Variable domains are stated inclusively by the modeling front end
/// (`w ∈ [1, 40]`), so unlike half-open time windows both bounds belong to
/// the set. An interval is never empty.
///
/// # Invariants
/// `min <= max`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClosedInterval<T>
where
    T: PrimInt,
{
    min: T,
    max: T,
}

/// An iterator over the integer points of a `ClosedInterval`.
///
/// # Examples
///
/// ```rust
/// # use scout_core::math::interval::ClosedInterval;
///
/// let iv = ClosedInterval::new(-1, 1);
/// let points: Vec<_> = iv.iter().collect();
/// assert_eq!(points, vec![-1, 0, 1]);
/// ```
#[derive(Clone, Debug)]
pub struct ClosedIntervalIterator<T>
where
    T: PrimInt,
{
    next: Option<T>,
    max: T,
}

impl<T> Iterator for ClosedIntervalIterator<T>
where
    T: PrimInt,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        // Stepping past `max` could overflow when `max == T::max_value()`.
        self.next = if current < self.max {
            Some(current + T::one())
        } else {
            None
        };
        Some(current)
    }
}

impl<T> FusedIterator for ClosedIntervalIterator<T> where T: PrimInt {}

impl<T> ClosedInterval<T>
where
    T: PrimInt,
{
    /// Creates a new `ClosedInterval`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use scout_core::math::interval::ClosedInterval;
    ///
    /// let iv = ClosedInterval::new(1, 40);
    /// assert_eq!(ClosedInterval::min(&iv), 1);
    /// assert_eq!(ClosedInterval::max(&iv), 40);
    /// ```
    #[inline]
    pub fn new(min: T, max: T) -> Self {
        assert!(
            min <= max,
            "called `ClosedInterval::new` with an empty range: min must be less than or equal to max"
        );
        Self { min, max }
    }

    /// Creates a new `ClosedInterval`, returning `None` if `min > max`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use scout_core::math::interval::ClosedInterval;
    ///
    /// assert!(ClosedInterval::try_new(3, 2).is_none());
    /// assert!(ClosedInterval::try_new(2, 2).is_some());
    /// ```
    #[inline]
    pub fn try_new(min: T, max: T) -> Option<Self> {
        if min <= max {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// Creates the interval `[value, value]`.
    #[inline]
    pub fn singleton(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Returns the inclusive lower bound.
    #[inline(always)]
    pub fn min(&self) -> T {
        self.min
    }

    /// Returns the inclusive upper bound.
    #[inline(always)]
    pub fn max(&self) -> T {
        self.max
    }

    /// Returns `true` if the interval holds exactly one value.
    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.min == self.max
    }

    /// Returns `true` if `value` lies within `[min, max]`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use scout_core::math::interval::ClosedInterval;
    ///
    /// let iv = ClosedInterval::new(-1, 1);
    /// assert!(iv.contains(-1));
    /// assert!(iv.contains(1));
    /// assert!(!iv.contains(2));
    /// ```
    #[inline]
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Returns `true` if every value of `self` also lies in `other`.
    #[inline]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        other.min <= self.min && self.max <= other.max
    }

    /// Returns the number of integers in the interval, or `None` if the count
    /// does not fit into a `u64`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use scout_core::math::interval::ClosedInterval;
    ///
    /// assert_eq!(ClosedInterval::new(1, 40).cardinality(), Some(40));
    /// assert_eq!(ClosedInterval::new(i64::MIN, i64::MAX).cardinality(), None);
    /// ```
    #[inline]
    pub fn cardinality(&self) -> Option<u64> {
        let min = self.min.to_i128()?;
        let max = self.max.to_i128()?;
        u64::try_from(max - min + 1).ok()
    }

    /// Returns the intersection of two intervals, or `None` if they are disjoint.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use scout_core::math::interval::ClosedInterval;
    ///
    /// let a = ClosedInterval::new(1, 40);
    /// let b = ClosedInterval::new(30, 50);
    /// assert_eq!(a.intersection(&b), Some(ClosedInterval::new(30, 40)));
    /// assert_eq!(a.intersection(&ClosedInterval::new(41, 50)), None);
    /// ```
    #[inline]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        Self::try_new(self.min.max(other.min), self.max.min(other.max))
    }

    /// Clamps `value` into the interval.
    #[inline]
    pub fn clamp(&self, value: T) -> T {
        value.max(self.min).min(self.max)
    }

    /// Returns an iterator over every integer in the interval.
    #[inline]
    pub fn iter(&self) -> ClosedIntervalIterator<T> {
        ClosedIntervalIterator {
            next: Some(self.min),
            max: self.max,
        }
    }
}

impl<T> IntoIterator for ClosedInterval<T>
where
    T: PrimInt,
{
    type Item = T;
    type IntoIter = ClosedIntervalIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> From<std::ops::RangeInclusive<T>> for ClosedInterval<T>
where
    T: PrimInt,
{
    /// # Panics
    ///
    /// Panics if the range is empty.
    fn from(range: std::ops::RangeInclusive<T>) -> Self {
        let (min, max) = range.into_inner();
        Self::new(min, max)
    }
}

impl<T> From<ClosedInterval<T>> for std::ops::RangeInclusive<T>
where
    T: PrimInt,
{
    fn from(interval: ClosedInterval<T>) -> Self {
        interval.min..=interval.max
    }
}

impl<T> std::fmt::Debug for ClosedInterval<T>
where
    T: PrimInt + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClosedInterval[{:?}, {:?}]", self.min, self.max)
    }
}

impl<T> std::fmt::Display for ClosedInterval<T>
where
    T: PrimInt + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
