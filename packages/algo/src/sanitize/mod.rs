//! Data Sanitization
//!
//! Integrity checks for items restored from persisted state.
//!
//! Checks:
//! - Review history is chronological
//! - Event numbers are finite and in range
//! - The last event agrees with the task's level and timestamp

use crate::error::SrsError;
use crate::item::Item;
use crate::task::TaskStats;
use crate::types::{ReviewEvent, TaskKind};

/// 检查数值是否有效 (非 NaN、非 Inf)
pub fn is_valid_number(x: f64) -> bool {
    x.is_finite()
}

fn corrupt(item: &str, task: TaskKind, reason: impl Into<String>) -> SrsError {
    SrsError::Corrupt {
        item: item.to_string(),
        reason: format!("{task}: {}", reason.into()),
    }
}

fn check_event(item: &str, task: TaskKind, idx: usize, event: &ReviewEvent) -> Result<(), SrsError> {
    let numbers = [
        ("elapsed_minutes", event.elapsed_minutes),
        ("reaction_time", event.reaction_time),
        ("priority", event.priority),
        ("memory_strength", event.memory_strength),
    ];
    for (name, value) in numbers {
        if !is_valid_number(value) || value < 0.0 {
            return Err(corrupt(item, task, format!("event {idx} has invalid {name} {value}")));
        }
    }
    if event.memory_strength > 1.0 {
        return Err(corrupt(
            item,
            task,
            format!("event {idx} memory strength {} above 1", event.memory_strength),
        ));
    }
    Ok(())
}

/// Validates one task's history against its current state
pub fn validate_task(item: &str, kind: TaskKind, task: &TaskStats) -> Result<(), SrsError> {
    let history = task.history();
    for (idx, event) in history.iter().enumerate() {
        check_event(item, kind, idx, event)?;
    }

    // 时间顺序检查
    if let Some(idx) = history
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        return Err(corrupt(item, kind, format!("event {} precedes event {idx}", idx + 1)));
    }

    if let Some(last) = history.last() {
        if last.level_new != task.level {
            return Err(corrupt(
                item,
                kind,
                format!("level {} differs from last event level {}", task.level, last.level_new),
            ));
        }
        if last.timestamp > task.last_reviewed {
            return Err(corrupt(item, kind, "last event is newer than last review"));
        }
    }
    Ok(())
}

/// Validates every task of an item
pub fn validate_item(item: &Item) -> Result<(), SrsError> {
    for (kind, task) in item.tasks().iter() {
        validate_task(&item.id, kind, task)?;
    }
    Ok(())
}
