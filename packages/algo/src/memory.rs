//! Priority & Memory-Strength Model
//!
//! Each level doubles the effective half-life of a task:
//! - Priority: P = Δt_min / 2^level
//! - Memory strength (modeled recall probability): S = 2^(-C × P)
//!
//! Priority is unbounded above; S lies in (0, 1] and equals 1 right after a
//! review.

use chrono::{DateTime, Utc};

use crate::error::SrsError;
use crate::types::DECAY_CONSTANT;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Minutes between `last_reviewed` and `now`
///
/// A review stamped after `now` is rejected rather than clamped.
pub fn elapsed_minutes(last_reviewed: DateTime<Utc>, now: DateTime<Utc>) -> Result<f64, SrsError> {
    if now < last_reviewed {
        return Err(SrsError::ReviewedInFuture { last_reviewed, now });
    }
    Ok((now - last_reviewed).num_milliseconds() as f64 / MILLIS_PER_MINUTE)
}

/// Half-life scale of a level, 2^level
#[inline]
fn half_life_scale(level: u32) -> f64 {
    2f64.powf(level as f64)
}

/// P = elapsed / 2^level
#[inline]
pub fn priority_from_elapsed(level: u32, elapsed_minutes: f64) -> f64 {
    elapsed_minutes / half_life_scale(level)
}

/// S = 2^(-C × P), floored at the smallest positive f64
///
/// The raw power underflows to 0 once P passes roughly 1000 (a level-0 task
/// left overnight); the floor keeps S inside (0, 1].
#[inline]
pub fn strength_from_priority(priority: f64) -> f64 {
    2f64.powf(-DECAY_CONSTANT * priority).max(f64::MIN_POSITIVE)
}

/// Review urgency of a task at `level` last seen at `last_reviewed`
pub fn priority(level: u32, last_reviewed: DateTime<Utc>, now: DateTime<Utc>) -> Result<f64, SrsError> {
    Ok(priority_from_elapsed(level, elapsed_minutes(last_reviewed, now)?))
}

/// Modeled probability that the task would be recalled right now
pub fn memory_strength(
    level: u32,
    last_reviewed: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<f64, SrsError> {
    Ok(strength_from_priority(priority(level, last_reviewed, now)?))
}
