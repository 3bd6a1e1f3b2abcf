use std::path::PathBuf;

use hanzi_srs_algo::SrsError;

/// Failures reading or writing the trainer's files
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("vocabulary line {line}: {reason}")]
    MalformedLine { line: u64, reason: String },
    #[error("unsupported snapshot format version {0}")]
    UnsupportedVersion(u32),
    #[error("duplicate item {0} in snapshot")]
    DuplicateItem(String),
    #[error("snapshot rejected: {0}")]
    Rejected(SrsError),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Anything a trainer command can fail with
#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Schedule(#[from] SrsError),
}
