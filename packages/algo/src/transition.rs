//! Level Transition Engine
//!
//! A level moves by a chain of Bernoulli trials whose success probability is
//! re-evaluated after every step at the same elapsed time:
//! - correct: p = 1 − S(level); each hit raises the level by one
//! - incorrect: p = S(level); each hit lowers the level by one, never below 1
//! - hinted: no change
//!
//! A correct answer after a long gap (low S) is strong evidence and tends to
//! jump several levels; a miss on a task that should have been easy (high S)
//! drops further.

use chrono::{DateTime, Utc};

use crate::clock::UniformSource;
use crate::error::SrsError;
use crate::memory::{elapsed_minutes, priority_from_elapsed, strength_from_priority};
use crate::types::{Outcome, MIN_LEVEL_AFTER_FAILURE};

#[inline]
fn strength_at(level: u32, elapsed: f64) -> f64 {
    strength_from_priority(priority_from_elapsed(level, elapsed))
}

/// New level after `outcome`, given the minutes since the last review
pub fn next_level_from_elapsed<R>(level: u32, elapsed: f64, outcome: Outcome, rng: &mut R) -> u32
where
    R: UniformSource + ?Sized,
{
    match outcome {
        Outcome::Hinted => level,
        Outcome::Correct => {
            let mut level = level;
            let mut p = 1.0 - strength_at(level, elapsed);
            while rng.next_uniform() < p {
                level = level.saturating_add(1);
                p = 1.0 - strength_at(level, elapsed);
            }
            level
        }
        Outcome::Incorrect => {
            let mut level = level;
            let mut p = strength_at(level, elapsed);
            while rng.next_uniform() < p && level > MIN_LEVEL_AFTER_FAILURE {
                level -= 1;
                p = strength_at(level, elapsed);
            }
            level
        }
    }
}

/// New level for a task last reviewed at `last_reviewed`
pub fn next_level<R>(
    level: u32,
    last_reviewed: DateTime<Utc>,
    now: DateTime<Utc>,
    outcome: Outcome,
    rng: &mut R,
) -> Result<u32, SrsError>
where
    R: UniformSource + ?Sized,
{
    let elapsed = elapsed_minutes(last_reviewed, now)?;
    Ok(next_level_from_elapsed(level, elapsed, outcome, rng))
}
