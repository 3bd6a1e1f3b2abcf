//! JSON snapshot of the known partition
//!
//! Loading is all-or-nothing: the first bad item rejects the whole file and
//! the pool is left untouched. Saving goes through a sibling temp file.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hanzi_srs_algo::sanitize::validate_item;
use hanzi_srs_algo::{
    Attribute, Item, ItemId, Pool, ReviewEvent, SrsError, TaskKind, TaskSet, TaskStats, VocabRecord,
};

use crate::error::StoreError;

pub const FORMAT_VERSION: u32 = 1;

// ==================== Records ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub format_version: u32,
    pub saved_at: DateTime<Utc>,
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub hanzi: String,
    pub pinyin: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub created_at: DateTime<Utc>,
    pub global_level: u32,
    pub global_last_reviewed: DateTime<Utc>,
    /// Keyed `"hanzi->pinyin"` and so on
    pub tasks: BTreeMap<String, TaskRecord>,
    #[serde(default)]
    pub confusions: BTreeMap<Attribute, BTreeMap<ItemId, u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub level: u32,
    pub last_reviewed: DateTime<Utc>,
    #[serde(default)]
    pub count_correct: u32,
    #[serde(default)]
    pub count_hint: u32,
    #[serde(default)]
    pub count_incorrect: u32,
    #[serde(default)]
    pub history: Vec<ReviewEvent>,
}

impl From<&TaskStats> for TaskRecord {
    fn from(task: &TaskStats) -> Self {
        Self {
            level: task.level,
            last_reviewed: task.last_reviewed,
            count_correct: task.count_correct,
            count_hint: task.count_hint,
            count_incorrect: task.count_incorrect,
            history: task.history().to_vec(),
        }
    }
}

impl From<&Item> for ItemRecord {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            hanzi: item.hanzi.clone(),
            pinyin: item.pinyin.clone(),
            translation: item.translation.clone(),
            context: item.context.clone(),
            created_at: item.created_at,
            global_level: item.global_level(),
            global_last_reviewed: item.global_last_reviewed(),
            tasks: item
                .tasks()
                .iter()
                .map(|(kind, task)| (kind.key(), TaskRecord::from(task)))
                .collect(),
            confusions: item.confusions().clone(),
        }
    }
}

impl ItemRecord {
    /// Rebuilds and validates the item
    pub fn into_item(self) -> Result<Item, SrsError> {
        let mut tasks = BTreeMap::new();
        for (key, task) in self.tasks {
            let kind = TaskKind::from_key(&key)?;
            let stats = TaskStats::from_parts(
                task.level,
                task.last_reviewed,
                [task.count_correct, task.count_hint, task.count_incorrect],
                task.history,
            );
            tasks.insert(kind, stats);
        }
        let tasks = TaskSet::from_map(&self.id, tasks)?;

        let record = VocabRecord {
            id: self.id,
            hanzi: self.hanzi,
            pinyin: self.pinyin,
            translation: self.translation,
            context: self.context,
        };
        let item = Item::restore(
            record,
            self.created_at,
            self.global_level,
            self.global_last_reviewed,
            tasks,
            self.confusions,
        )?;
        validate_item(&item)?;
        Ok(item)
    }
}

// ==================== Encode / Decode ====================

pub fn encode(pool: &Pool, saved_at: DateTime<Utc>) -> SnapshotFile {
    SnapshotFile {
        format_version: FORMAT_VERSION,
        saved_at,
        items: pool.known().values().map(ItemRecord::from).collect(),
    }
}

/// Validates every item before returning any of them
pub fn decode(file: SnapshotFile) -> Result<Vec<Item>, StoreError> {
    if file.format_version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion(file.format_version));
    }

    let mut seen = BTreeSet::new();
    let mut items = Vec::with_capacity(file.items.len());
    for record in file.items {
        if !seen.insert(record.id.clone()) {
            return Err(StoreError::DuplicateItem(record.id));
        }
        items.push(record.into_item().map_err(StoreError::Rejected)?);
    }
    Ok(items)
}

// ==================== File I/O ====================

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Reads a snapshot; a missing file is an empty first run
pub fn load_snapshot(path: &Path) -> Result<Vec<Item>, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no snapshot yet, starting empty");
            return Ok(Vec::new());
        }
        Err(err) => return Err(StoreError::io(path, err)),
    };

    let snapshot: SnapshotFile = serde_json::from_reader(BufReader::new(file))?;
    let items = decode(snapshot)?;
    tracing::info!(path = %path.display(), items = items.len(), "snapshot loaded");
    Ok(items)
}

/// Loads a snapshot into `pool`, leaving it untouched on any error
pub fn restore_into(pool: &mut Pool, path: &Path) -> Result<usize, StoreError> {
    let items = load_snapshot(path)?;
    let count = items.len();
    for item in items {
        pool.insert_known(item);
    }
    Ok(count)
}

pub fn save_snapshot(path: &Path, pool: &Pool, now: DateTime<Utc>) -> Result<(), StoreError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|err| StoreError::io(dir, err))?;
    }

    let tmp = temp_path(path);
    let file = File::create(&tmp).map_err(|err| StoreError::io(&tmp, err))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &encode(pool, now))?;
    writer.flush().map_err(|err| StoreError::io(&tmp, err))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|err| StoreError::io(&tmp, err))?;
    drop(writer);

    fs::rename(&tmp, path).map_err(|err| StoreError::io(path, err))?;
    tracing::info!(path = %path.display(), items = pool.known().len(), "snapshot saved");
    Ok(())
}
