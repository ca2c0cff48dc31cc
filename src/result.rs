use crate::app_dirs::AppDirs;
use crate::bank::Difficulty;
use crate::session::User;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Outcome of a finished session. Written once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub name: String,
    pub group: String,
    pub difficulty: Difficulty,
    pub score: u64,
    pub max_score: u64,
    pub timestamp: DateTime<Local>,
}

impl ResultSummary {
    pub fn new(
        user: &User,
        difficulty: Difficulty,
        score: u64,
        max_score: u64,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            name: user.name.clone(),
            group: user.group.clone(),
            difficulty,
            score,
            max_score,
            timestamp,
        }
    }

    /// Score as a rounded percentage of the maximum; 0 when nothing could be scored.
    pub fn percent(&self) -> u32 {
        if self.max_score == 0 {
            return 0;
        }
        ((self.score as f64 / self.max_score as f64) * 100.0).round() as u32
    }
}

/// A single "last result" slot.
pub trait ResultStore {
    /// Overwrites whatever was stored before.
    fn save(&self, summary: &ResultSummary) -> std::io::Result<()>;
    fn load(&self) -> Option<ResultSummary>;
}

#[derive(Debug, Clone)]
pub struct FileResultStore {
    path: PathBuf,
}

impl FileResultStore {
    pub fn new() -> Self {
        let path = AppDirs::last_result_path()
            .unwrap_or_else(|| PathBuf::from("kviz_last_result.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore for FileResultStore {
    fn save(&self, summary: &ResultSummary) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(summary)?;
        fs::write(&self.path, data)
    }

    fn load(&self) -> Option<ResultSummary> {
        let bytes = fs::read(&self.path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable last result");
                None
            }
        }
    }
}

/// Keeps the slot in memory; handy for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    slot: RefCell<Option<ResultSummary>>,
}

impl ResultStore for MemoryResultStore {
    fn save(&self, summary: &ResultSummary) -> std::io::Result<()> {
        *self.slot.borrow_mut() = Some(summary.clone());
        Ok(())
    }

    fn load(&self) -> Option<ResultSummary> {
        self.slot.borrow().clone()
    }
}
