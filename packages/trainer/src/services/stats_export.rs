//! Tab-separated per-item level report

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use hanzi_srs_algo::{ItemStats, TaskKind};

use crate::error::StoreError;

pub fn header() -> Vec<String> {
    let mut columns = vec!["id".to_string(), "hanzi".to_string()];
    columns.extend(TaskKind::ALL.iter().map(TaskKind::key));
    columns.push("mean".to_string());
    columns.push("min".to_string());
    columns
}

pub fn write_stats<W: Write>(writer: W, rows: &[ItemStats]) -> Result<(), StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);

    writer.write_record(header())?;
    for row in rows {
        let mut record = vec![row.id.clone(), row.hanzi.clone()];
        record.extend(row.levels.iter().map(u32::to_string));
        record.push(format!("{:.2}", row.mean));
        record.push(row.min.to_string());
        writer.write_record(&record)?;
    }
    writer
        .flush()
        .map_err(|err| StoreError::Csv(csv::Error::from(err)))?;
    Ok(())
}

pub fn export_stats(path: &Path, rows: &[ItemStats]) -> Result<(), StoreError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|err| StoreError::io(dir, err))?;
    }
    let file = File::create(path).map_err(|err| StoreError::io(path, err))?;
    write_stats(file, rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "stats exported");
    Ok(())
}
