//! Last-run cursor storage
//!
//! The cursor is the instant of the last successful pass. Listing rows
//! created after it are new. It is only ever written by the pass runner once a
//! pass has fully completed.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use crate::core::{ExtractError, Result};

/// Storage for the incremental cursor
pub trait CursorStore: Send + Sync {
    /// Cursor of the last successful pass, `None` before the first one
    fn load(&self) -> Result<Option<NaiveDateTime>>;

    /// Record a successful pass
    fn save(&self, last_run: NaiveDateTime) -> Result<()>;

    /// Forget the cursor so the next pass selects every PO
    fn clear(&self) -> Result<()>;
}

/// On-disk cursor record
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CursorRecord {
    last_run: Option<NaiveDateTime>,
    updated_at: NaiveDateTime,
    #[serde(default)]
    runs: u64,
}

/// Cursor persisted as a small JSON file
#[derive(Debug, Clone)]
pub struct FileCursorStore {
    path: PathBuf,
}

impl FileCursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_record(&self) -> Result<Option<CursorRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ExtractError::state(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&content).map(Some).map_err(|e| {
            ExtractError::state(format!("Corrupt cursor file {}: {}", self.path.display(), e))
        })
    }

    /// Write through a sibling temp file so a crash never leaves half a record
    fn write_record(&self, record: &CursorRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(record)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Run count of the stored record; an unreadable record starts over at 0
    fn previous_runs(&self) -> u64 {
        match self.read_record() {
            Ok(record) => record.map(|r| r.runs).unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "Replacing unreadable cursor file");
                0
            }
        }
    }

    /// Overwrite the stored record, keeping the run count when it is readable
    fn update(&self, last_run: Option<NaiveDateTime>) -> Result<()> {
        let runs = self.previous_runs();

        self.write_record(&CursorRecord {
            last_run,
            updated_at: Local::now().naive_local(),
            runs: if last_run.is_some() { runs + 1 } else { runs },
        })
    }
}

impl CursorStore for FileCursorStore {
    fn load(&self) -> Result<Option<NaiveDateTime>> {
        Ok(self.read_record()?.and_then(|r| r.last_run))
    }

    fn save(&self, last_run: NaiveDateTime) -> Result<()> {
        self.update(Some(last_run))
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            self.update(None)?;
        }
        Ok(())
    }
}

/// Process-scoped cursor, lost on exit
#[derive(Debug, Default)]
pub struct MemoryCursorStore {
    last_run: Mutex<Option<NaiveDateTime>>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cursor(last_run: NaiveDateTime) -> Self {
        Self {
            last_run: Mutex::new(Some(last_run)),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<NaiveDateTime>>> {
        self.last_run
            .lock()
            .map_err(|_| ExtractError::state("Cursor lock poisoned"))
    }
}

impl CursorStore for MemoryCursorStore {
    fn load(&self) -> Result<Option<NaiveDateTime>> {
        Ok(*self.slot()?)
    }

    fn save(&self, last_run: NaiveDateTime) -> Result<()> {
        *self.slot()? = Some(last_run);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}
