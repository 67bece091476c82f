use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::models::{CorpusRow, REPORT_COLUMNS};

/// Incremental CSV report.
///
/// The file is opened once per run; every row is flushed as soon as it is
/// written so an interrupted run leaves a readable report behind.
pub struct ReportWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows_written: usize,
}

impl ReportWriter {
    /// Create (or truncate) the report and write the header
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report: {:?}", path))?;
        let mut report = Self::from_file(path, file);
        report.write_header()?;
        Ok(report)
    }

    /// Open the report for appending; the header is written only if the file is empty
    pub fn append(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open report for appending: {:?}", path))?;
        let is_empty = file
            .metadata()
            .with_context(|| format!("Failed to stat report: {:?}", path))?
            .len()
            == 0;

        let mut report = Self::from_file(path, file);
        if is_empty {
            report.write_header()?;
        }
        Ok(report)
    }

    fn from_file(path: &Path, file: File) -> Self {
        Self {
            path: path.to_path_buf(),
            writer: csv::WriterBuilder::new().has_headers(false).from_writer(file),
            rows_written: 0,
        }
    }

    fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(REPORT_COLUMNS)
            .with_context(|| format!("Failed to write report header: {:?}", self.path))?;
        self.flush()
    }

    /// Append one row and flush it to disk
    pub fn write_row(&mut self, row: &CorpusRow) -> Result<()> {
        self.writer
            .serialize(row)
            .with_context(|| format!("Failed to write row {} to {:?}", row.file_name, self.path))?;
        self.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush report: {:?}", self.path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close the report
    pub fn finish(mut self) -> Result<usize> {
        self.flush()?;
        Ok(self.rows_written)
    }
}

/// Read every row of an existing report
pub fn read_report(path: &Path) -> Result<Vec<CorpusRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open report: {:?}", path))?;

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize().enumerate() {
        let row: CorpusRow =
            record.with_context(|| format!("Malformed row {} in {:?}", line + 1, path))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Ids already present in a report; a missing report has none
pub fn completed_ids(path: &Path) -> Result<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    Ok(read_report(path)?
        .into_iter()
        .map(|row| row.file_name)
        .collect())
}

/// Cut an incomplete final record left behind by an interrupted run.
///
/// A record is complete when it has every report column and ends with a line
/// terminator. Only the last record is ever cut; damage earlier in the file is
/// left for [`read_report`] to reject. Returns the id of the dropped record.
pub fn truncate_incomplete_tail(path: &Path) -> Result<Option<String>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Failed to read report: {:?}", path)),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes.as_slice());
    let mut record = csv::ByteRecord::new();
    let mut incomplete: Option<(u64, String)> = None;

    loop {
        let start = reader.position().byte();
        let has_record = reader
            .read_byte_record(&mut record)
            .with_context(|| format!("Failed to scan report: {:?}", path))?;
        if !has_record {
            break;
        }
        if incomplete.is_some() {
            debug!("Damaged record in the middle of {:?}; leaving it in place", path);
            return Ok(None);
        }

        let end = reader.position().byte() as usize;
        let terminated = matches!(bytes[..end].last(), Some(b'\n' | b'\r'));
        if record.len() != REPORT_COLUMNS.len() || !terminated {
            let id = record
                .get(0)
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .unwrap_or_default();
            incomplete = Some((start, id));
        }
    }

    let Some((start, id)) = incomplete else {
        return Ok(None);
    };
    OpenOptions::new()
        .write(true)
        .open(path)
        .and_then(|file| file.set_len(start))
        .with_context(|| format!("Failed to truncate report: {:?}", path))?;
    Ok(Some(id))
}

/// Write any serializable value as pretty JSON
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}
