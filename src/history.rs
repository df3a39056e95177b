use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::app_dirs::AppDirs;
use crate::session::SessionSummary;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("could not determine where to store history")]
    NoLocation,
    #[error("history file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("history file {path} is corrupt: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One finished test as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    pub date: DateTime<Local>,
    pub mode: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub correct: usize,
    pub wrong: usize,
}

impl From<&SessionSummary> for HistoryRecord {
    fn from(summary: &SessionSummary) -> Self {
        Self {
            date: summary.date,
            mode: summary.mode_label.clone(),
            wpm: summary.wpm,
            accuracy: summary.accuracy,
            correct: summary.correct,
            wrong: summary.wrong,
        }
    }
}

/// Append-only collection of results in insertion order
pub trait HistoryStore {
    fn load(&self) -> Result<Vec<HistoryRecord>, HistoryError>;
    fn append(&self, record: HistoryRecord) -> Result<(), HistoryError>;
    fn clear(&self) -> Result<(), HistoryError>;
}

/// History kept as a pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new() -> Result<Self, HistoryError> {
        AppDirs::history_path()
            .map(Self::with_path)
            .ok_or(HistoryError::NoLocation)
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    fn io_error(&self, source: io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_slice(&bytes).map_err(|source| HistoryError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn append(&self, record: HistoryRecord) -> Result<(), HistoryError> {
        // a corrupt file is reported, never overwritten
        let mut records = self.load()?;
        records.push(record);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let data = serde_json::to_vec_pretty(&records).map_err(|source| HistoryError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, data).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), records = records.len(), "history saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), HistoryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "history cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Stand-in used when no history location can be determined. Every call
/// fails, so the failure surfaces where results are saved or shown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistoryStore;

impl HistoryStore for NoHistoryStore {
    fn load(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        Err(HistoryError::NoLocation)
    }

    fn append(&self, _record: HistoryRecord) -> Result<(), HistoryError> {
        Err(HistoryError::NoLocation)
    }

    fn clear(&self) -> Result<(), HistoryError> {
        Err(HistoryError::NoLocation)
    }
}

/// Opens the default JSON store, or [`NoHistoryStore`] when there is nowhere
/// to keep it
pub fn open_default() -> Box<dyn HistoryStore> {
    match JsonHistoryStore::new() {
        Ok(store) => {
            debug!(path = %store.path.display(), "history store opened");
            Box::new(store)
        }
        Err(err) => {
            warn!(%err, "history disabled");
            Box::new(NoHistoryStore)
        }
    }
}

/// Records ordered for display, most recent first
pub fn newest_first(records: &[HistoryRecord]) -> Vec<&HistoryRecord> {
    records.iter().rev().collect()
}
