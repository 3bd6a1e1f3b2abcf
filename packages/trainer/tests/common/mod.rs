#![allow(dead_code)]

use std::fs;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use hanzi_srs_algo::TrainingParams;
use hanzi_srs_trainer::Config;

pub const VOCABULARY: &str = "# id\thanzi\tpinyin\ttranslation\tcontext\n\
                              1\t你好\tni3 hao3\thello\n\
                              2\t谢谢\txie4 xie5\tthank you\n\
                              3\t再见\tzai4 jian4\tgoodbye\n\
                              4\t朋友\tpeng2 you5\tfriend\t他是我的朋友\n\
                              5\t老师\tlao3 shi1\tteacher\n\
                              6\t你\tni3\tyou\n";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap()
}

pub fn write_vocabulary(dir: &Path, text: &str) {
    fs::write(dir.join("vocabulary.tsv"), text).unwrap();
}

/// Config rooted in a fresh temp dir holding the sample vocabulary
pub fn temp_config() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    write_vocabulary(dir.path(), VOCABULARY);
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        vocabulary_path: dir.path().join("vocabulary.tsv"),
        snapshot_path: dir.path().join("known.json"),
        stats_path: dir.path().join("stats.tsv"),
        params: TrainingParams::default(),
        seed: Some(17),
        log_level: "info".to_string(),
        log_dir: None,
    };
    (dir, config)
}
