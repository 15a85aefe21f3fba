//! Parallel processing strategies

use nitrogis_core::{Error, Result};
use rayon::prelude::*;

/// How independent tasks are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// Single-threaded processing
    #[default]
    Sequential,
    /// Parallel processing on the global Rayon pool
    Parallel,
    /// Parallel on a dedicated pool of the given size
    ParallelWith(usize),
}

impl ProcessingMode {
    /// `Sequential` for one worker or fewer, a bounded pool otherwise
    pub fn with_workers(workers: usize) -> Self {
        if workers <= 1 {
            ProcessingMode::Sequential
        } else {
            ProcessingMode::ParallelWith(workers)
        }
    }
}

/// Strategy for running independent, index-addressed tasks
pub trait ParallelStrategy {
    /// Map a function over indices and collect results in index order,
    /// regardless of completion order.
    fn par_map<T, F>(&self, range: std::ops::Range<usize>, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send;
}

impl ParallelStrategy for ProcessingMode {
    fn par_map<T, F>(&self, range: std::ops::Range<usize>, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self {
            ProcessingMode::Sequential => Ok(range.map(f).collect()),
            ProcessingMode::Parallel => Ok(range.into_par_iter().map(f).collect()),
            ProcessingMode::ParallelWith(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(*threads)
                    .build()
                    .map_err(|e| Error::Other(format!("failed to build thread pool: {}", e)))?;
                Ok(pool.install(|| range.into_par_iter().map(f).collect()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_workers_picks_mode() {
        assert_eq!(ProcessingMode::with_workers(0), ProcessingMode::Sequential);
        assert_eq!(ProcessingMode::with_workers(1), ProcessingMode::Sequential);
        assert_eq!(ProcessingMode::with_workers(4), ProcessingMode::ParallelWith(4));
    }

    #[test]
    fn par_map_preserves_order() {
        for mode in [
            ProcessingMode::Sequential,
            ProcessingMode::Parallel,
            ProcessingMode::ParallelWith(3),
        ] {
            let out = mode
                .par_map(0..50, |i| {
                    // later indices finish first
                    std::thread::sleep(std::time::Duration::from_micros((50 - i) as u64 * 10));
                    i * i
                })
                .unwrap();
            let expected: Vec<usize> = (0..50).map(|i| i * i).collect();
            assert_eq!(out, expected, "{:?}", mode);
        }
    }
}
