use chrono::{DateTime, Utc};

use crate::types::ItemId;

/// Errors raised by the scheduling core
///
/// Empty pools are not errors; selectors return `None` instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SrsError {
    #[error("invalid outcome code {0}, expected 1, 0 or -1")]
    InvalidOutcome(i64),
    #[error("unparsable outcome: {0}")]
    UnparsableOutcome(String),
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("unknown task key: {0}")]
    UnknownTaskKey(String),
    #[error("item {item} is missing task {task}")]
    MissingTask { item: ItemId, task: String },
    #[error("last review at {last_reviewed} is after now ({now})")]
    ReviewedInFuture {
        last_reviewed: DateTime<Utc>,
        now: DateTime<Utc>,
    },
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),
    #[error("item {0} has not been introduced yet")]
    NotKnown(ItemId),
    #[error("corrupt item {item}: {reason}")]
    Corrupt { item: ItemId, reason: String },
}
