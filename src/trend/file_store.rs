//! JSON file backend for the trend log.
//!
//! The whole log is a JSON array of entries sorted by (location, date).
//! Writers serialize on an exclusive lock held on a sidecar `<path>.lock`
//! file, read the current array, apply the upsert, write the result to a
//! temporary file in the same directory and rename it over the original.
//! Readers take no lock: the rename is atomic, so they always see either
//! the previous or the next complete file.
//!
//! A file that exists but does not parse is moved aside to
//! `<path>.corrupt-<timestamp>` on the next upsert, with an operator
//! warning, and the log restarts empty.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;

use crate::logging::{self, DataSource};
use crate::model::{TrendEntry, TrendError};
use crate::trend::{TrendStore, select_recent, upsert_sorted};

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Blocks until this process holds the writer lock. Released on drop.
    fn lock(&self) -> Result<File, TrendError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.sibling_path(".lock"))?;
        file.lock()?;
        Ok(file)
    }

    /// All entries; a missing or empty file is an empty log.
    fn read_entries(&self) -> Result<Vec<TrendEntry>, TrendError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(TrendError::Io(e)),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|e| TrendError::Corrupt(e.to_string()))
    }

    fn write_entries(&self, entries: &[TrendEntry]) -> Result<(), TrendError> {
        let tmp = NamedTempFile::new_in(self.directory())?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, entries).map_err(std::io::Error::from)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| TrendError::Io(e.error))?;
        Ok(())
    }

    /// Renames a corrupt log out of the way and returns where it went.
    fn quarantine(&self) -> Result<PathBuf, TrendError> {
        let target = self.sibling_path(&format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S")));
        fs::rename(&self.path, &target)?;
        Ok(target)
    }
}

impl TrendStore for JsonFileStore {
    fn upsert(&mut self, entry: &TrendEntry) -> Result<(), TrendError> {
        let _guard = self.lock()?;

        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(TrendError::Corrupt(reason)) => {
                let moved_to = self.quarantine()?;
                logging::warn(
                    DataSource::TrendLog,
                    None,
                    &format!(
                        "Trend log {} is corrupt ({}); moved to {} and starting a new log",
                        self.path.display(),
                        reason,
                        moved_to.display()
                    ),
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        upsert_sorted(&mut entries, entry);
        self.write_entries(&entries)
    }

    fn recent(&mut self, location: &str, limit: usize) -> Result<Vec<TrendEntry>, TrendError> {
        Ok(select_recent(&self.read_entries()?, location, limit))
    }
}
