//! CSV export of the grid's filtered and sorted rows.

use super::column::Column;
use super::record::Record;
use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Where an export ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
  pub path: Option<PathBuf>,
  pub rows: usize,
}

/// Export hook for a record list. The default writes a CSV file; views can
/// be given another implementation.
pub trait Exporter: Send + Sync {
  fn export(&self, rows: &[&Record], columns: &[Column]) -> Result<ExportOutcome>;
}

/// Write `rows` as CSV: a header row of column headers, then one line per
/// record with each column's raw value. Quoting is left to the csv writer.
pub fn write_csv<W: Write>(output: W, rows: &[&Record], columns: &[Column]) -> Result<()> {
  let mut writer = csv::WriterBuilder::new()
    .has_headers(false)
    .from_writer(output);

  let headers: Vec<&str> = columns.iter().map(|c| c.header).collect();
  writer
    .write_record(&headers)
    .map_err(|e| eyre!("Failed to write CSV header: {}", e))?;

  for record in rows {
    let values: Vec<String> = columns
      .iter()
      .map(|c| c.value_of(record).to_text().unwrap_or_default())
      .collect();
    writer
      .write_record(&values)
      .map_err(|e| eyre!("Failed to write CSV row: {}", e))?;
  }

  writer
    .flush()
    .map_err(|e| eyre!("Failed to flush CSV output: {}", e))?;
  Ok(())
}

/// Writes `{prefix}_{unix millis}.csv` into a directory
#[derive(Debug, Clone)]
pub struct CsvFileExporter {
  dir: PathBuf,
  prefix: String,
}

impl CsvFileExporter {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self {
      dir: dir.into(),
      prefix: "export".to_string(),
    }
  }

  pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.prefix = prefix.into();
    self
  }

  fn file_path(&self) -> PathBuf {
    self
      .dir
      .join(format!("{}_{}.csv", self.prefix, Utc::now().timestamp_millis()))
  }
}

impl Exporter for CsvFileExporter {
  fn export(&self, rows: &[&Record], columns: &[Column]) -> Result<ExportOutcome> {
    std::fs::create_dir_all(&self.dir)
      .map_err(|e| eyre!("Failed to create export directory {:?}: {}", self.dir, e))?;

    let path = self.file_path();
    let file = File::create(&path).map_err(|e| eyre!("Failed to create {:?}: {}", path, e))?;
    write_csv(file, rows, columns)?;

    info!(path = %path.display(), rows = rows.len(), "Exported CSV");
    Ok(ExportOutcome {
      path: Some(path),
      rows: rows.len(),
    })
  }
}
