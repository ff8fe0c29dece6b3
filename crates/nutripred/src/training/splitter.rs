//! Seeded train/eval partitioning.
//!
//! One shuffle split is drawn per training run and shared by every
//! per-nutrient model, so all models see the same partitions and their
//! metrics are comparable.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Row indices of the two partitions, each sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<u32>,
    pub eval: Vec<u32>,
}

/// Shuffle rows with a seeded RNG and split off an evaluation partition.
///
/// The evaluation partition holds `ceil(n_rows * eval_fraction)` rows,
/// capped so training always keeps at least one row. With one row total the
/// evaluation partition comes out empty and metrics degrade to zero.
pub fn shuffle_split(n_rows: usize, eval_fraction: f32, seed: u64) -> SplitIndices {
    let mut indices: Vec<u32> = (0..n_rows as u32).collect();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let requested = (n_rows as f32 * eval_fraction).ceil() as usize;
    let n_eval = requested.min(n_rows.saturating_sub(1));

    let mut eval = indices[..n_eval].to_vec();
    let mut train = indices[n_eval..].to_vec();
    train.sort_unstable();
    eval.sort_unstable();

    SplitIndices { train, eval }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let split = shuffle_split(10, 0.2, 42);
        assert_eq!(split.eval.len(), 2);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn test_eval_size_rounds_up() {
        let split = shuffle_split(5, 0.25, 42);
        assert_eq!(split.eval.len(), 2);
        assert_eq!(split.train.len(), 3);
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let split = shuffle_split(50, 0.2, 42);
        let mut all: Vec<u32> = split.train.iter().chain(split.eval.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<u32>>());
    }

    #[test]
    fn test_split_is_seeded() {
        assert_eq!(shuffle_split(100, 0.2, 42), shuffle_split(100, 0.2, 42));
        assert_ne!(shuffle_split(100, 0.2, 42), shuffle_split(100, 0.2, 43));
    }

    #[test]
    fn test_split_is_shuffled() {
        // With a real shuffle the eval partition is almost surely not a prefix.
        let split = shuffle_split(1000, 0.2, 42);
        assert_ne!(split.eval, (0..200).collect::<Vec<u32>>());
    }

    #[test]
    fn test_single_row_keeps_training_nonempty() {
        let split = shuffle_split(1, 0.2, 42);
        assert_eq!(split.train, vec![0]);
        assert!(split.eval.is_empty());
    }

    #[test]
    fn test_zero_rows() {
        let split = shuffle_split(0, 0.2, 42);
        assert!(split.train.is_empty());
        assert!(split.eval.is_empty());
    }

    #[test]
    fn test_zero_fraction_keeps_all_rows_for_training() {
        let split = shuffle_split(10, 0.0, 42);
        assert_eq!(split.train.len(), 10);
        assert!(split.eval.is_empty());
    }
}
