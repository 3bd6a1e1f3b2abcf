use std::path::PathBuf;
use std::str::FromStr;

use hanzi_srs_algo::TrainingParams;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub vocabulary_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub stats_path: PathBuf,
    pub params: TrainingParams,
    pub seed: Option<u64>,
    pub log_level: String,
    /// Set when `ENABLE_FILE_LOGS` is on; `LOG_DIR` or `<data>/logs`
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("HANZI_SRS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let path_or = |key: &str, file: &str| {
            lookup(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(file))
        };
        let vocabulary_path = path_or("HANZI_SRS_VOCAB", "vocabulary.tsv");
        let snapshot_path = path_or("HANZI_SRS_SNAPSHOT", "known.json");
        let stats_path = path_or("HANZI_SRS_STATS", "stats.tsv");

        let defaults = TrainingParams::default();
        let params = TrainingParams {
            max_ephemeral_words: parse_or(&lookup, "HANZI_SRS_MAX_EPHEMERAL", defaults.max_ephemeral_words)?,
            max_fleeting_words: parse_or(&lookup, "HANZI_SRS_MAX_FLEETING", defaults.max_fleeting_words)?,
            max_total_words: parse_or(&lookup, "HANZI_SRS_MAX_TOTAL", defaults.max_total_words)?,
            batch_size: parse_or(&lookup, "HANZI_SRS_BATCH_SIZE", defaults.batch_size)?,
        };

        let seed = match lookup("HANZI_SRS_SEED") {
            Some(value) => Some(parse_value("HANZI_SRS_SEED", value)?),
            None => None,
        };

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let file_logs = lookup("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let log_dir = file_logs.then(|| path_or("LOG_DIR", "logs"));

        Ok(Self {
            data_dir,
            vocabulary_path,
            snapshot_path,
            stats_path,
            params,
            seed,
            log_level,
            log_dir,
        })
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid { key, value })
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => parse_value(key, value),
        None => Ok(default),
    }
}
