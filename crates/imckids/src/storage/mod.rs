//! Storage layer for imckids.
//!
//! Records live in a single append-only flat log. Generated certificates live
//! in a separate directory that is wiped together with the log.

pub mod row;

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::{ClassifiedRecord, MeasurementRecord};

/// Append-only record log plus its certificates directory.
///
/// There is no locking: concurrent writers from several processes may
/// interleave rows.
#[derive(Debug, Clone)]
pub struct RecordStore {
    /// Path to the record log.
    records_path: PathBuf,
    /// Directory of generated certificates.
    certificates_dir: PathBuf,
}

/// What a successful [`RecordStore::clear_all`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// The record log existed and was deleted.
    pub records_removed: bool,
    /// The certificates directory existed and was deleted.
    pub certificates_removed: bool,
}

impl RecordStore {
    /// Create a store over the given locations. Nothing is touched on disk.
    pub fn new(records_path: impl Into<PathBuf>, certificates_dir: impl Into<PathBuf>) -> Self {
        Self {
            records_path: records_path.into(),
            certificates_dir: certificates_dir.into(),
        }
    }

    /// Create a store at the configured locations.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.records_path(), config.certificates_dir())
    }

    /// Get the path to the record log.
    #[must_use]
    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    /// Get the certificates directory.
    #[must_use]
    pub fn certificates_dir(&self) -> &Path {
        &self.certificates_dir
    }

    /// Append one record to the log.
    ///
    /// Creates the log and its parent directories if needed. Duplicate names
    /// are allowed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if the log or its parent
    /// directory cannot be created or written.
    pub fn append(&self, record: &MeasurementRecord) -> Result<()> {
        if let Some(parent) = self.records_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| self.unavailable(source))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.records_path)
            .map_err(|source| self.unavailable(source))?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(row::encode(record))
            .map_err(|e| self.csv_error(e))?;
        writer.flush().map_err(|source| self.unavailable(source))?;

        info!(
            "Appended record for {} ({})",
            record.name(),
            record.weigh_date_text()
        );
        Ok(())
    }

    /// Read every record in insertion order, with classification attached.
    ///
    /// A missing log means no records yet and yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if the log exists but cannot be
    /// read, [`Error::MalformedRecord`] for an unparseable row, and
    /// [`Error::UnsupportedCohort`] for a row whose age has no percentile row.
    pub fn load_all(&self) -> Result<Vec<ClassifiedRecord>> {
        let file = match File::open(&self.records_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No record log at {}", self.records_path.display());
                return Ok(Vec::new());
            }
            Err(source) => return Err(self.unavailable(source)),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut records = Vec::new();
        for result in reader.records() {
            let fields = result.map_err(|e| self.csv_error(e))?;
            let line = fields.position().map_or(0, csv::Position::line);
            let record = row::decode(&fields, line)?;
            let classified = record.classified().map_err(|e| {
                error!("Line {line} of {}: {e}", self.records_path.display());
                e
            })?;
            records.push(classified);
        }

        debug!(
            "Loaded {} records from {}",
            records.len(),
            self.records_path.display()
        );
        Ok(records)
    }

    /// Remove the record log and the certificates directory.
    ///
    /// Both removals are attempted even if the first fails; nothing is rolled
    /// back. Missing resources are not failures.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClearIncomplete`] listing every resource that could
    /// not be removed.
    pub fn clear_all(&self) -> Result<ClearReport> {
        let mut report = ClearReport::default();
        let mut failures = Vec::new();

        match remove_if_exists(&self.records_path, |p| fs::remove_file(p)) {
            Ok(removed) => report.records_removed = removed,
            Err(e) => failures.push((self.records_path.clone(), e.to_string())),
        }
        match remove_if_exists(&self.certificates_dir, |p| fs::remove_dir_all(p)) {
            Ok(removed) => report.certificates_removed = removed,
            Err(e) => failures.push((self.certificates_dir.clone(), e.to_string())),
        }

        if failures.is_empty() {
            info!(
                "Cleared records ({}) and certificates ({})",
                self.records_path.display(),
                self.certificates_dir.display()
            );
            Ok(report)
        } else {
            Err(Error::ClearIncomplete { failures })
        }
    }

    fn unavailable(&self, source: io::Error) -> Error {
        Error::StorageUnavailable {
            path: self.records_path.clone(),
            source,
        }
    }

    fn csv_error(&self, err: csv::Error) -> Error {
        let line = err.position().map_or(0, csv::Position::line);
        if err.is_io_error() {
            if let csv::ErrorKind::Io(source) = err.into_kind() {
                return self.unavailable(source);
            }
            return Error::malformed(line, "I/O error");
        }
        Error::malformed(line, err.to_string())
    }
}

fn remove_if_exists(
    path: &Path,
    remove: impl FnOnce(&Path) -> io::Result<()>,
) -> io::Result<bool> {
    match remove(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
