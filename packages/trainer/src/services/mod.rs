pub mod snapshot;
pub mod stats_export;
pub mod vocabulary;
