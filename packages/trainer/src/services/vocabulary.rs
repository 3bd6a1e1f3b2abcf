//! Vocabulary file ingestion
//!
//! Tab-separated rows: `id  hanzi  pinyin  translation  [context]`.
//! Lines starting with `#` and blank lines are skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use hanzi_srs_algo::{IngestOutcome, Pool, VocabRecord};

use crate::error::StoreError;

const REQUIRED_COLUMNS: [&str; 4] = ["id", "hanzi", "pinyin", "translation"];

/// Counts of what ingestion did to the pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub added: usize,
    pub replaced: usize,
    pub updated: usize,
}

impl IngestSummary {
    pub fn total(&self) -> usize {
        self.added + self.replaced + self.updated
    }
}

pub fn parse_vocabulary<R: Read>(reader: R) -> Result<Vec<VocabRecord>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        if row.len() < REQUIRED_COLUMNS.len() {
            return Err(StoreError::MalformedLine {
                line,
                reason: format!("expected at least 4 columns, found {}", row.len()),
            });
        }
        if let Some(name) = REQUIRED_COLUMNS
            .iter()
            .zip(row.iter())
            .find(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
        {
            return Err(StoreError::MalformedLine {
                line,
                reason: format!("empty {name}"),
            });
        }

        records.push(VocabRecord {
            id: row[0].to_string(),
            hanzi: row[1].to_string(),
            pinyin: row[2].to_string(),
            translation: row[3].to_string(),
            context: row.get(4).filter(|c| !c.is_empty()).map(str::to_string),
        });
    }
    Ok(records)
}

pub fn load_vocabulary(path: &Path) -> Result<Vec<VocabRecord>, StoreError> {
    let file = File::open(path).map_err(|err| StoreError::io(path, err))?;
    let records = parse_vocabulary(file)?;
    tracing::debug!(path = %path.display(), count = records.len(), "vocabulary parsed");
    Ok(records)
}

pub fn ingest_all(
    pool: &mut Pool,
    records: impl IntoIterator<Item = VocabRecord>,
    now: DateTime<Utc>,
) -> IngestSummary {
    let mut summary = IngestSummary::default();
    for record in records {
        match pool.ingest(record, now) {
            IngestOutcome::AddedNew => summary.added += 1,
            IngestOutcome::ReplacedNew => summary.replaced += 1,
            IngestOutcome::UpdatedContext => summary.updated += 1,
        }
    }
    summary
}
