//! Common utilities used across the crate.
//!
//! Currently this is the parallelism switch handed through the training
//! path: the engine decides the thread count once and everything below it
//! just honors the flag.

use rayon::prelude::*;

// =============================================================================
// Parallelism Configuration
// =============================================================================

/// Whether parallel execution is allowed.
///
/// Training components receive this flag instead of managing thread pools
/// themselves; the pool is set up once in [`run_with_threads`]. With
/// `Parallel` a component may fan out over `rayon`, with `Sequential` it
/// must stay on the calling thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Derive the mode from a thread count.
    ///
    /// `1` forces sequential execution. `0` means auto: parallel unless the
    /// ambient rayon pool is single-threaded anyway. Anything else is
    /// parallel.
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    /// Returns `true` if parallel execution is allowed.
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Map over `iter`, collecting results in input order.
    ///
    /// Both modes preserve ordering, so per-tree seeding stays deterministic
    /// no matter how many threads run the map.
    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, iter: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().map(f).collect()
        } else {
            iter.into_iter().map(f).collect()
        }
    }
}

// =============================================================================
// Thread Pool Setup
// =============================================================================

/// Run a closure under the requested thread count.
///
/// `0` auto-detects (all available cores), `1` runs sequentially without
/// building a pool, and `n > 1` installs a dedicated pool of exactly `n`
/// threads for the duration of the closure.
#[inline]
pub fn run_with_threads<T: Send>(n_threads: usize, f: impl FnOnce(Parallelism) -> T + Send) -> T {
    let parallelism = Parallelism::from_threads(n_threads);

    match parallelism {
        Parallelism::Sequential => f(Parallelism::Sequential),
        Parallelism::Parallel => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build()
                .expect("Failed to create thread pool");
            pool.install(|| f(Parallelism::Parallel))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallelism_from_threads() {
        assert_eq!(Parallelism::from_threads(1), Parallelism::Sequential);
        assert_eq!(Parallelism::from_threads(2), Parallelism::Parallel);
        assert_eq!(Parallelism::from_threads(8), Parallelism::Parallel);
    }

    #[test]
    fn test_maybe_par_map_preserves_order() {
        let input: Vec<u32> = (0..64).collect();
        let seq = Parallelism::Sequential.maybe_par_map(input.clone(), |x| x * 2);
        let par = Parallelism::Parallel.maybe_par_map(input, |x| x * 2);
        assert_eq!(seq, par);
        assert_eq!(seq[10], 20);
    }

    #[test]
    fn test_run_with_threads_sequential() {
        let result = run_with_threads(1, |p| {
            assert!(!p.is_parallel());
            42
        });
        assert_eq!(result, 42);
    }

    #[test]
    fn test_run_with_threads_respects_thread_count() {
        let result = run_with_threads(2, |p| {
            assert!(p.is_parallel());
            rayon::current_num_threads()
        });
        assert_eq!(result, 2);
    }
}
