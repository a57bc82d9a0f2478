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

//! Random candidate generation.
//!
//! A sampler fills an `Instance` with one value per variable, drawn from the
//! current sampling domains. Nothing is carried between calls apart from the
//! random source, so a sampler can be restarted at any point.

use crate::domains::SamplingDomains;
use rand::Rng;
use scout_model::instance::Instance;

pub trait InstanceSampler {
    /// Returns the name of the sampler.
    fn name(&self) -> &str;

    /// Overwrites `instance` with a fresh candidate, resizing it to
    /// `domains.len()` if needed.
    fn sample_into<R>(&mut self, domains: &SamplingDomains, rng: &mut R, instance: &mut Instance)
    where
        R: Rng;

    /// Draws a fresh candidate.
    fn sample<R>(&mut self, domains: &SamplingDomains, rng: &mut R) -> Instance
    where
        R: Rng,
    {
        let mut instance = Instance::zeroed(domains.len());
        self.sample_into(domains, rng, &mut instance);
        instance
    }
}

/// Draws every variable independently and uniformly from its sampling domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniformSampler;

impl UniformSampler {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl InstanceSampler for UniformSampler {
    fn name(&self) -> &str {
        "UniformSampler"
    }

    #[inline]
    fn sample_into<R>(&mut self, domains: &SamplingDomains, rng: &mut R, instance: &mut Instance)
    where
        R: Rng,
    {
        if instance.len() != domains.len() {
            instance.resize(domains.len());
        }

        for (value, domain) in instance.values_mut().iter_mut().zip(domains.domains()) {
            *value = if domain.is_singleton() {
                domain.min()
            } else {
                rng.random_range(domain.min()..=domain.max())
            };
        }
    }
}

impl std::fmt::Display for UniformSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UniformSampler")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use scout_core::math::interval::ClosedInterval;
    use scout_model::index::VarIndex;

    fn domains() -> SamplingDomains {
        SamplingDomains::from_declared(vec![
            ClosedInterval::new(1, 40),
            ClosedInterval::new(-1, 1),
            ClosedInterval::singleton(5),
            ClosedInterval::new(i64::MIN, i64::MAX),
        ])
    }

    #[test]
    fn test_values_stay_within_domains() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut sampler = UniformSampler::new();
        let d = domains();

        for _ in 0..1_000 {
            let instance = sampler.sample(&d, &mut rng);
            assert_eq!(instance.len(), d.len());
            for (value, domain) in instance.values().iter().zip(d.domains()) {
                assert!(domain.contains(*value), "{} not in {}", value, domain);
            }
            assert_eq!(instance.get(VarIndex::new(2)), 5);
        }
    }

    #[test]
    fn test_every_value_is_reachable() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut sampler = UniformSampler::new();
        let d = SamplingDomains::from_declared(vec![ClosedInterval::new(-1, 1)]);

        let mut seen = [false; 3];
        let mut instance = Instance::default();
        for _ in 0..200 {
            sampler.sample_into(&d, &mut rng, &mut instance);
            seen[(instance.values()[0] + 1) as usize] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_same_seed_same_candidates() {
        let d = domains();
        let mut a = ChaCha8Rng::seed_from_u64(3);
        let mut b = ChaCha8Rng::seed_from_u64(3);
        let mut sampler = UniformSampler::new();

        for _ in 0..10 {
            assert_eq!(sampler.sample(&d, &mut a), sampler.sample(&d, &mut b));
        }
    }

    #[test]
    fn test_narrowed_domains_are_honored() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut sampler = UniformSampler::new();
        let mut d = domains();
        d.choice_made(VarIndex::new(0), 12, 13);

        for _ in 0..100 {
            let value = sampler.sample(&d, &mut rng).get(VarIndex::new(0));
            assert!((12..=13).contains(&value));
        }
    }
}
