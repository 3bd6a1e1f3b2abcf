//! # hanzi-srs-trainer
//!
//! File-backed shell around `hanzi-srs-algo`: environment config, tracing
//! setup, vocabulary ingestion, JSON snapshots, pinyin helpers and the
//! stats report used by the `hanzi-srs` binary.

pub mod config;
pub mod error;
pub mod logging;
pub mod pinyin;
pub mod services;
pub mod trainer;

pub use config::{Config, ConfigError};
pub use error::{StoreError, TrainerError};
pub use trainer::{StatusReport, Trainer};
