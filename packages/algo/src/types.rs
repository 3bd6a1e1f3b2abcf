//! Common Types and Constants
//!
//! Shared data structures used across all scheduling modules.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SrsError;

// ==================== Constants ====================

/// Decay constant of the memory-strength curve: S = 2^(-C * priority)
pub const DECAY_CONSTANT: f64 = 1.0887147152069994;

/// Priority at or above which an item counts as due for the composition policy
pub const DUE_PRIORITY: f64 = 1.0;

/// Lowest level a failed attempt can push a task down to
pub const MIN_LEVEL_AFTER_FAILURE: u32 = 1;

/// Upper level bounds (exclusive) of the first five gradations
pub const GRADATION_BOUNDS: [u32; 5] = [4, 8, 12, 16, 20];

/// Default number of items per training round
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Item identifier as found in the vocabulary file
pub type ItemId = String;

// ==================== Attributes & Tasks ====================

/// One of the three linked facets of a vocabulary item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Hanzi,
    Pinyin,
    Translation,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [Attribute::Hanzi, Attribute::Pinyin, Attribute::Translation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Hanzi => "hanzi",
            Attribute::Pinyin => "pinyin",
            Attribute::Translation => "translation",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = SrsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hanzi" | "character" => Ok(Attribute::Hanzi),
            "pinyin" | "pronunciation" => Ok(Attribute::Pinyin),
            "translation" | "meaning" => Ok(Attribute::Translation),
            other => Err(SrsError::UnknownAttribute(other.to_string())),
        }
    }
}

/// Directed drill: recall `target` when shown `source`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskKind {
    source: Attribute,
    target: Attribute,
}

impl TaskKind {
    /// The six ordered pairs of distinct attributes, in storage order
    pub const ALL: [TaskKind; 6] = [
        TaskKind::pair(Attribute::Hanzi, Attribute::Pinyin),
        TaskKind::pair(Attribute::Hanzi, Attribute::Translation),
        TaskKind::pair(Attribute::Pinyin, Attribute::Hanzi),
        TaskKind::pair(Attribute::Pinyin, Attribute::Translation),
        TaskKind::pair(Attribute::Translation, Attribute::Hanzi),
        TaskKind::pair(Attribute::Translation, Attribute::Pinyin),
    ];

    const fn pair(source: Attribute, target: Attribute) -> Self {
        Self { source, target }
    }

    /// Builds a task, rejecting the degenerate `source == target` pair
    pub fn try_new(source: Attribute, target: Attribute) -> Result<Self, SrsError> {
        if source == target {
            return Err(SrsError::UnknownTaskKey(format!("{source}->{target}")));
        }
        Ok(Self::pair(source, target))
    }

    pub fn source(&self) -> Attribute {
        self.source
    }

    pub fn target(&self) -> Attribute {
        self.target
    }

    /// Position of this task in [`TaskKind::ALL`]
    pub fn index(&self) -> usize {
        let s = self.source as usize;
        let t = self.target as usize;
        // skip the diagonal: each source row holds two targets
        s * 2 + if t > s { t - 1 } else { t }
    }

    /// Snapshot key, e.g. `hanzi->pinyin`
    pub fn key(&self) -> String {
        format!("{}->{}", self.source, self.target)
    }

    pub fn from_key(key: &str) -> Result<Self, SrsError> {
        let (source, target) = key
            .split_once("->")
            .ok_or_else(|| SrsError::UnknownTaskKey(key.to_string()))?;
        let source = source
            .parse::<Attribute>()
            .map_err(|_| SrsError::UnknownTaskKey(key.to_string()))?;
        let target = target
            .parse::<Attribute>()
            .map_err(|_| SrsError::UnknownTaskKey(key.to_string()))?;
        Self::try_new(source, target)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

// ==================== Outcomes ====================

/// Result of one attempt, as reported by the training front end
///
/// Persisted as its integer code (+1 / 0 / -1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Outcome {
    /// Correct on the first try
    Correct,
    /// Correct with a hint or on the second try; leaves the level untouched
    Hinted,
    /// Incorrect
    Incorrect,
}

impl Outcome {
    pub fn code(&self) -> i64 {
        match self {
            Outcome::Correct => 1,
            Outcome::Hinted => 0,
            Outcome::Incorrect => -1,
        }
    }
}

impl TryFrom<i64> for Outcome {
    type Error = SrsError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Outcome::Correct),
            0 => Ok(Outcome::Hinted),
            -1 => Ok(Outcome::Incorrect),
            other => Err(SrsError::InvalidOutcome(other)),
        }
    }
}

impl From<Outcome> for i64 {
    fn from(outcome: Outcome) -> Self {
        outcome.code()
    }
}

impl FromStr for Outcome {
    type Err = SrsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "correct" => Ok(Outcome::Correct),
            "hint" | "hinted" => Ok(Outcome::Hinted),
            "incorrect" | "wrong" => Ok(Outcome::Incorrect),
            other => {
                let code = other
                    .parse::<i64>()
                    .map_err(|_| SrsError::UnparsableOutcome(other.to_string()))?;
                Outcome::try_from(code)
            }
        }
    }
}

// ==================== Review History ====================

/// One attempt on one task, appended once and never changed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewEvent {
    /// When the attempt happened
    pub timestamp: DateTime<Utc>,
    /// Minutes since the previous review of this task
    pub elapsed_minutes: f64,
    /// Reaction time in seconds (not measured, always 0)
    pub reaction_time: f64,
    /// Priority at the old level
    pub priority: f64,
    /// Memory strength at the new level against the old timestamp
    pub memory_strength: f64,
    /// Whether a hint was used
    pub hint_used: bool,
    pub outcome: Outcome,
    pub level_old: u32,
    pub level_new: u32,
}

// ==================== Training Parameters ====================

/// Pool composition thresholds
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Cap on items in the ephemeral bucket
    pub max_ephemeral_words: usize,
    /// Cap on items in the ephemeral and fleeting buckets combined
    pub max_fleeting_words: usize,
    /// Cap on due items
    pub max_total_words: usize,
    /// Items per training round
    pub batch_size: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            max_ephemeral_words: 5,
            max_fleeting_words: 10,
            max_total_words: 30,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

// ==================== Gradations ====================

/// Coarse named range of global level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gradation {
    Ephemeral,
    Fleeting,
    ShortTerm,
    Transition,
    LongTerm,
    Permanent,
}

impl Gradation {
    pub const ALL: [Gradation; 6] = [
        Gradation::Ephemeral,
        Gradation::Fleeting,
        Gradation::ShortTerm,
        Gradation::Transition,
        Gradation::LongTerm,
        Gradation::Permanent,
    ];

    pub fn from_level(level: u32) -> Self {
        GRADATION_BOUNDS
            .iter()
            .position(|&bound| level < bound)
            .map(|idx| Self::ALL[idx])
            .unwrap_or(Gradation::Permanent)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gradation::Ephemeral => "ephemeral",
            Gradation::Fleeting => "fleeting",
            Gradation::ShortTerm => "short-term",
            Gradation::Transition => "transition",
            Gradation::LongTerm => "long-term",
            Gradation::Permanent => "permanent",
        }
    }
}

impl fmt::Display for Gradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
