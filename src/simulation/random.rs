// Pseudo-random source consumed by the driver

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform integers in an inclusive range. Implementations must be
/// reproducible for a given seed.
pub trait RandomSource {
    fn next_int(&mut self, low: i64, high: i64) -> i64;
}

#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw a seed from the OS
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn next_int(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        self.rng.random_range(low..=high)
    }
}

/// Replays a fixed list of values, cycling when exhausted. Values outside
/// the requested range are clamped into it.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<i64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: impl Into<Vec<i64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_int(&mut self, low: i64, high: i64) -> i64 {
        if self.values.is_empty() {
            return low;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(low, high.max(low))
    }
}
