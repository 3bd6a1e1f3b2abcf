//! Item Aggregate
//!
//! A vocabulary item owns one [`TaskStats`] per directed task and a summary
//! global level equal to its weakest task.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::UniformSource;
use crate::error::SrsError;
use crate::task::TaskStats;
use crate::types::{Attribute, Gradation, ItemId, Outcome, ReviewEvent, TaskKind};

/// Parsed vocabulary line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabRecord {
    pub id: ItemId,
    pub hanzi: String,
    /// Pinyin with tone numbers, e.g. `ni3 hao3`
    pub pinyin: String,
    pub translation: String,
    pub context: Option<String>,
}

/// The six task statistics of an item, indexed by [`TaskKind`]
#[derive(Clone, Debug, PartialEq)]
pub struct TaskSet {
    tasks: [TaskStats; 6],
}

impl TaskSet {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            tasks: std::array::from_fn(|_| TaskStats::new(created_at)),
        }
    }

    /// Builds the set from a keyed map, which must hold every task exactly once
    pub fn from_map(item: &str, mut map: BTreeMap<TaskKind, TaskStats>) -> Result<Self, SrsError> {
        let mut tasks = Vec::with_capacity(TaskKind::ALL.len());
        for kind in TaskKind::ALL {
            let stats = map.remove(&kind).ok_or_else(|| SrsError::MissingTask {
                item: item.to_string(),
                task: kind.key(),
            })?;
            tasks.push(stats);
        }
        let tasks: [TaskStats; 6] = tasks
            .try_into()
            .map_err(|_| SrsError::Corrupt {
                item: item.to_string(),
                reason: "task count mismatch".to_string(),
            })?;
        Ok(Self { tasks })
    }

    pub fn get(&self, kind: TaskKind) -> &TaskStats {
        &self.tasks[kind.index()]
    }

    pub fn get_mut(&mut self, kind: TaskKind) -> &mut TaskStats {
        &mut self.tasks[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskKind, &TaskStats)> {
        TaskKind::ALL.into_iter().zip(self.tasks.iter())
    }

    pub fn min_level(&self) -> u32 {
        self.tasks.iter().map(|t| t.level).min().unwrap_or(0)
    }

    pub fn mean_level(&self) -> f64 {
        self.tasks.iter().map(|t| t.level as f64).sum::<f64>() / self.tasks.len() as f64
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub hanzi: String,
    pub pinyin: String,
    pub translation: String,
    pub context: Option<String>,
    pub created_at: DateTime<Utc>,
    global_level: u32,
    global_last_reviewed: DateTime<Utc>,
    tasks: TaskSet,
    confusions: BTreeMap<Attribute, BTreeMap<ItemId, u32>>,
}

impl Item {
    /// Fresh item with all six tasks at level 0
    pub fn new(record: VocabRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: record.id,
            hanzi: record.hanzi,
            pinyin: record.pinyin,
            translation: record.translation,
            context: record.context,
            created_at: now,
            global_level: 0,
            global_last_reviewed: now,
            tasks: TaskSet::new(now),
            confusions: BTreeMap::new(),
        }
    }

    /// Rebuilds an item from persisted parts
    ///
    /// The stored global level must equal the weakest task level.
    pub fn restore(
        record: VocabRecord,
        created_at: DateTime<Utc>,
        global_level: u32,
        global_last_reviewed: DateTime<Utc>,
        tasks: TaskSet,
        confusions: BTreeMap<Attribute, BTreeMap<ItemId, u32>>,
    ) -> Result<Self, SrsError> {
        if tasks.min_level() != global_level {
            return Err(SrsError::Corrupt {
                item: record.id,
                reason: format!(
                    "global level {global_level} differs from weakest task level {}",
                    tasks.min_level()
                ),
            });
        }
        Ok(Self {
            id: record.id,
            hanzi: record.hanzi,
            pinyin: record.pinyin,
            translation: record.translation,
            context: record.context,
            created_at,
            global_level,
            global_last_reviewed,
            tasks,
            confusions,
        })
    }

    pub fn attribute(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::Hanzi => &self.hanzi,
            Attribute::Pinyin => &self.pinyin,
            Attribute::Translation => &self.translation,
        }
    }

    pub fn global_level(&self) -> u32 {
        self.global_level
    }

    pub fn global_last_reviewed(&self) -> DateTime<Utc> {
        self.global_last_reviewed
    }

    pub fn gradation(&self) -> Gradation {
        Gradation::from_level(self.global_level)
    }

    /// Priority of the item as a whole, from its global level and timestamp
    pub fn global_priority(&self, now: DateTime<Utc>) -> Result<f64, SrsError> {
        crate::memory::priority(self.global_level, self.global_last_reviewed, now)
    }

    pub fn tasks(&self) -> &TaskSet {
        &self.tasks
    }

    #[cfg(test)]
    pub(crate) fn tasks_mut(&mut self) -> &mut TaskSet {
        &mut self.tasks
    }

    pub fn task(&self, kind: TaskKind) -> &TaskStats {
        self.tasks.get(kind)
    }

    /// Read-only attempt log of one task
    pub fn history(&self, kind: TaskKind) -> &[ReviewEvent] {
        self.tasks.get(kind).history()
    }

    pub fn confusions(&self) -> &BTreeMap<Attribute, BTreeMap<ItemId, u32>> {
        &self.confusions
    }

    /// Bumps the confusion count of `other` for `attribute`
    pub fn note_confusion(&mut self, attribute: Attribute, other: &str) -> u32 {
        let count = self
            .confusions
            .entry(attribute)
            .or_default()
            .entry(other.to_string())
            .or_insert(0);
        *count += 1;
        *count
    }

    /// Re-derives the global level from the six tasks
    pub fn update_global(&mut self, now: DateTime<Utc>) {
        self.global_level = self.tasks.min_level();
        self.global_last_reviewed = now;
    }

    /// Records one attempt on `kind` and refreshes the global level
    pub fn record_attempt<R>(
        &mut self,
        kind: TaskKind,
        outcome: Outcome,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<ReviewEvent, SrsError>
    where
        R: UniformSource + ?Sized,
    {
        let event = self.tasks.get_mut(kind).record_attempt(outcome, now, rng)?.clone();
        self.update_global(now);
        Ok(event)
    }
}

/// Per-item level summary for reports
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemStats {
    pub id: ItemId,
    pub hanzi: String,
    /// Levels in [`TaskKind::ALL`] order
    pub levels: [u32; 6],
    pub mean: f64,
    pub min: u32,
}

impl ItemStats {
    pub fn of(item: &Item) -> Self {
        let levels = std::array::from_fn(|idx| item.task(TaskKind::ALL[idx]).level);
        Self {
            id: item.id.clone(),
            hanzi: item.hanzi.clone(),
            levels,
            mean: item.tasks().mean_level(),
            min: item.tasks().min_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ScriptedSource;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 10, 7, 0, 0).unwrap()
    }

    fn record(id: &str) -> VocabRecord {
        VocabRecord {
            id: id.to_string(),
            hanzi: "你好".to_string(),
            pinyin: "ni3 hao3".to_string(),
            translation: "hello".to_string(),
            context: None,
        }
    }

    #[test]
    fn test_new_item_has_six_tasks_at_zero() {
        let item = Item::new(record("w1"), t0());
        assert_eq!(item.tasks().iter().count(), 6);
        assert!(item.tasks().iter().all(|(_, t)| t.level == 0));
        assert_eq!(item.global_level(), 0);
        assert_eq!(item.gradation(), Gradation::Ephemeral);
    }

    #[test]
    fn test_global_level_is_weakest_task() {
        let mut item = Item::new(record("w1"), t0());
        // push every task but one to a higher level
        let mut source = ScriptedSource::new(std::iter::repeat(0.0).take(500));
        let now = t0() + Duration::days(3);
        for kind in TaskKind::ALL.iter().skip(1) {
            item.record_attempt(*kind, Outcome::Correct, now, &mut source).unwrap();
        }
        assert_eq!(item.global_level(), 0);
        assert_eq!(item.global_last_reviewed(), now);

        item.record_attempt(TaskKind::ALL[0], Outcome::Correct, now, &mut source).unwrap();
        let expected = item.tasks().iter().map(|(_, t)| t.level).min().unwrap();
        assert_eq!(item.global_level(), expected);
        assert!(expected > 0);
    }

    #[test]
    fn test_task_set_from_map_requires_all_tasks() {
        let mut map: BTreeMap<TaskKind, TaskStats> =
            TaskKind::ALL.iter().map(|k| (*k, TaskStats::new(t0()))).collect();
        assert!(TaskSet::from_map("w1", map.clone()).is_ok());

        map.remove(&TaskKind::ALL[3]);
        let err = TaskSet::from_map("w1", map).unwrap_err();
        assert!(matches!(err, SrsError::MissingTask { .. }));
    }

    #[test]
    fn test_restore_rejects_inconsistent_global_level() {
        let tasks = TaskSet::new(t0());
        let err = Item::restore(record("w1"), t0(), 3, t0(), tasks, BTreeMap::new()).unwrap_err();
        assert!(matches!(err, SrsError::Corrupt { .. }));
    }

    #[test]
    fn test_note_confusion_counts() {
        let mut item = Item::new(record("w1"), t0());
        assert_eq!(item.note_confusion(Attribute::Pinyin, "w2"), 1);
        assert_eq!(item.note_confusion(Attribute::Pinyin, "w2"), 2);
        assert_eq!(item.confusions()[&Attribute::Pinyin]["w2"], 2);
    }

    #[test]
    fn test_item_stats_summary() {
        let mut item = Item::new(record("w1"), t0());
        let mut source = ScriptedSource::new(std::iter::repeat(0.0).take(500));
        let kind = TaskKind::ALL[2];
        item.record_attempt(kind, Outcome::Correct, t0() + Duration::hours(2), &mut source)
            .unwrap();
        let stats = ItemStats::of(&item);
        assert_eq!(stats.min, 0);
        assert!(stats.levels[2] > 0);
        assert!((stats.mean - stats.levels[2] as f64 / 6.0).abs() < 1e-12);
    }
}
