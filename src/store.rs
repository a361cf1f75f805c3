//! Persistence of the tournament record: one JSON document per key, overwritten in place.

use crate::models::TournamentRecord;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Key the bot keeps its single tournament under.
pub const DEFAULT_KEY: &str = "tournament_data";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access tournament record at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("tournament record at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode tournament record: {0}")]
    Encode(#[source] serde_json::Error),
}

/// What to do when a stored record cannot be parsed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CorruptRecordPolicy {
    /// Log a warning and treat the record as inactive. The broken file is overwritten
    /// by the next save.
    #[default]
    Reset,
    /// Surface `StoreError::Corrupt`.
    Fail,
}

/// Load/save a tournament record by key. No concurrency control: last writer wins.
pub trait RecordStore: Send + Sync {
    /// Absent or empty records load as `TournamentRecord::Inactive`.
    fn load(&self, key: &str) -> Result<TournamentRecord, StoreError>;

    /// Replace whatever is stored under `key`.
    fn save(&self, key: &str, record: &TournamentRecord) -> Result<(), StoreError>;
}

/// Records as pretty-printed JSON files `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    policy: CorruptRecordPolicy,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>, policy: CorruptRecordPolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_error(path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<TournamentRecord, StoreError> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(TournamentRecord::Inactive)
            }
            Err(e) => return Err(Self::io_error(&path, e)),
        };
        if raw.trim().is_empty() {
            return Ok(TournamentRecord::Inactive);
        }
        match serde_json::from_str(&raw) {
            Ok(record) => Ok(record),
            Err(source) => match self.policy {
                CorruptRecordPolicy::Reset => {
                    log::warn!(
                        "Tournament record at {} is corrupt ({}); treating as inactive",
                        path.display(),
                        source
                    );
                    Ok(TournamentRecord::Inactive)
                }
                CorruptRecordPolicy::Fail => Err(StoreError::Corrupt { path, source }),
            },
        }
    }

    fn save(&self, key: &str, record: &TournamentRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(&self.dir, e))?;
        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(record).map_err(StoreError::Encode)?;
        // Readers only ever see a complete file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| Self::io_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_error(&path, e))?;
        log::debug!("Saved tournament record to {}", path.display());
        Ok(())
    }
}

/// In-process store, for tests and for running without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, TournamentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, key: &str) -> Result<TournamentRecord, StoreError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(key).cloned().unwrap_or_default())
    }

    fn save(&self, key: &str, record: &TournamentRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.insert(key.to_string(), record.clone());
        Ok(())
    }
}
