//! Clock & Randomness
//!
//! Every scheduling decision reads "now" through [`Clock`] and every random
//! draw through [`UniformSource`], so a fixed clock plus a seeded (or
//! scripted) source makes a training run fully reproducible.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ==================== Clock ====================

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn set(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

// ==================== Uniform Draws ====================

/// Source of uniform random numbers used by the scheduler
pub trait UniformSource {
    /// Uniform draw in [0, 1)
    fn next_uniform(&mut self) -> f64;

    /// Uniform index in `0..len`; `len` must be non-zero
    fn pick_index(&mut self, len: usize) -> usize;

    /// `amount` distinct indices from `0..len` (`amount <= len`)
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize>;
}

impl<R: Rng + ?Sized> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }

    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(self, len, amount).into_vec()
    }
}

/// Seeded generator; `None` seeds from OS entropy
pub fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Replays a fixed list of draws
///
/// Once the script is exhausted every draw returns 1.0, which is never below
/// a transition probability, so level walks stop.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: VecDeque<f64>,
    consumed: usize,
}

impl ScriptedSource {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Number of draws taken so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl UniformSource for ScriptedSource {
    fn next_uniform(&mut self) -> f64 {
        match self.draws.pop_front() {
            Some(u) => {
                self.consumed += 1;
                u
            }
            None => 1.0,
        }
    }

    fn pick_index(&mut self, len: usize) -> usize {
        let u = self.next_uniform().clamp(0.0, 1.0);
        ((u * len as f64) as usize).min(len.saturating_sub(1))
    }

    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        // partial Fisher-Yates over 0..len
        let mut pool: Vec<usize> = (0..len).collect();
        let amount = amount.min(len);
        for i in 0..amount {
            let j = i + self.pick_index(len - i);
            pool.swap(i, j);
        }
        pool.truncate(amount);
        pool
    }
}
