//! Task Statistics Tracker
//!
//! One [`TaskStats`] per directed task of an item: the current level, when
//! it was last reviewed, and the append-only log of every attempt.

use chrono::{DateTime, Utc};

use crate::clock::UniformSource;
use crate::error::SrsError;
use crate::memory::{elapsed_minutes, priority_from_elapsed, strength_from_priority};
use crate::transition::next_level_from_elapsed;
use crate::types::{Outcome, ReviewEvent};

#[derive(Clone, Debug, PartialEq)]
pub struct TaskStats {
    pub level: u32,
    pub last_reviewed: DateTime<Utc>,
    // Kept for snapshot compatibility; nothing increments these.
    pub count_correct: u32,
    pub count_hint: u32,
    pub count_incorrect: u32,
    history: Vec<ReviewEvent>,
}

impl TaskStats {
    /// Fresh task at level 0
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            level: 0,
            last_reviewed: created_at,
            count_correct: 0,
            count_hint: 0,
            count_incorrect: 0,
            history: Vec::new(),
        }
    }

    /// Rebuilds a task from persisted parts
    pub fn from_parts(
        level: u32,
        last_reviewed: DateTime<Utc>,
        counters: [u32; 3],
        history: Vec<ReviewEvent>,
    ) -> Self {
        let [count_correct, count_hint, count_incorrect] = counters;
        Self {
            level,
            last_reviewed,
            count_correct,
            count_hint,
            count_incorrect,
            history,
        }
    }

    /// Attempt log, oldest first
    pub fn history(&self) -> &[ReviewEvent] {
        &self.history
    }

    pub fn priority(&self, now: DateTime<Utc>) -> Result<f64, SrsError> {
        crate::memory::priority(self.level, self.last_reviewed, now)
    }

    pub fn memory_strength(&self, now: DateTime<Utc>) -> Result<f64, SrsError> {
        crate::memory::memory_strength(self.level, self.last_reviewed, now)
    }

    /// Applies one attempt and returns the event it appended
    ///
    /// The event's priority is taken at the old level and its memory strength
    /// at the new level, both against the pre-attempt timestamp.
    pub fn record_attempt<R>(
        &mut self,
        outcome: Outcome,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<&ReviewEvent, SrsError>
    where
        R: UniformSource + ?Sized,
    {
        let elapsed = elapsed_minutes(self.last_reviewed, now)?;
        let level_old = self.level;
        let level_new = next_level_from_elapsed(level_old, elapsed, outcome, rng);

        self.history.push(ReviewEvent {
            timestamp: now,
            elapsed_minutes: elapsed,
            reaction_time: 0.0,
            priority: priority_from_elapsed(level_old, elapsed),
            memory_strength: strength_from_priority(priority_from_elapsed(level_new, elapsed)),
            hint_used: outcome == Outcome::Hinted,
            outcome,
            level_old,
            level_new,
        });

        self.level = level_new;
        self.last_reviewed = now;

        tracing::trace!(level_old, level_new, elapsed, ?outcome, "task level updated");

        Ok(&self.history[self.history.len() - 1])
    }
}
