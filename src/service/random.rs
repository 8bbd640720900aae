//! Random index sources for the `Random` draw policy.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniformly distributed pool indices.
///
/// Lets the allocation cache use the thread-local generator in production
/// and a seeded, reproducible one in tests.
pub trait RandSource: Send + Sync {
    /// Return an index uniformly distributed over `0..len`.
    ///
    /// `len` is never 0.
    fn index(&self, len: usize) -> usize;
}

/// A `RandSource` backed by the thread-local RNG (`rand::rng()`).
///
/// Zero-sized; each call reaches the calling thread's generator, so it is
/// contention-free across threads.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// A process-wide `StdRng` seeded from a fixed value.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandSource for SeededRandom {
    fn index(&self, len: usize) -> usize {
        self.rng.lock().random_range(0..len)
    }
}
