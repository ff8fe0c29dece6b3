//! Bootstrap row sampling for bagging.
//!
//! Each tree in a bagged forest trains on its own bootstrap resample: as
//! many rows as the training partition, drawn with replacement. On average
//! a resample covers ~63% of distinct rows, which is what decorrelates the
//! trees.

use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Draws bootstrap resamples over a fixed row range.
///
/// Sampled indices come back sorted so downstream passes touch rows in
/// memory order.
#[derive(Debug, Clone)]
pub struct BootstrapSampler {
    /// Total number of rows in the training partition.
    num_rows: u32,
}

impl BootstrapSampler {
    pub fn new(num_rows: u32) -> Self {
        Self { num_rows }
    }

    /// Sample `num_rows` row indices with replacement.
    ///
    /// Fully determined by `seed`: the same seed always produces the same
    /// resample, independent of thread count or call order.
    pub fn sample(&self, seed: u64) -> Vec<u32> {
        if self.num_rows == 0 {
            return Vec::new();
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let dist = Uniform::from(0..self.num_rows);

        let mut sampled: Vec<u32> = (0..self.num_rows).map(|_| dist.sample(&mut rng)).collect();
        sampled.sort_unstable();
        sampled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_size_matches_rows() {
        let sampler = BootstrapSampler::new(100);
        assert_eq!(sampler.sample(42).len(), 100);
    }

    #[test]
    fn test_sample_is_sorted_and_in_range() {
        let sampler = BootstrapSampler::new(100);
        let indices = sampler.sample(42);

        for i in 1..indices.len() {
            assert!(indices[i] >= indices[i - 1]);
        }
        for &idx in &indices {
            assert!(idx < 100);
        }
    }

    #[test]
    fn test_sample_draws_with_replacement() {
        let sampler = BootstrapSampler::new(100);
        let indices = sampler.sample(42);

        let mut deduped = indices.clone();
        deduped.dedup();
        assert!(deduped.len() < indices.len());
    }

    #[test]
    fn test_sample_reproducible() {
        let sampler = BootstrapSampler::new(100);
        assert_eq!(sampler.sample(42), sampler.sample(42));
        assert_ne!(sampler.sample(42), sampler.sample(43));
    }

    #[test]
    fn test_empty_range() {
        let sampler = BootstrapSampler::new(0);
        assert!(sampler.sample(7).is_empty());
    }
}
