use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{BoardError, BoardResult};
use crate::models::Task;

/// Returns the path to the tasks snapshot (`tasks.json`).
///
/// The path is determined in the following order:
/// 1. `DRILLBOARD_DB` environment variable.
/// 2. `~/.local/share/drillboard/tasks.json` (on Linux).
/// 3. `./tasks.json` (fallback).
pub fn default_db_path() -> PathBuf {
    std::env::var("DRILLBOARD_DB").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("drillboard");
        p.push("tasks.json");
        p
    })
}

/// The single slot holding the whole task list. Every save replaces the file.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> TaskStore {
        TaskStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the snapshot. A missing file is an empty board; unparsable
    /// content is `PersistenceRead`.
    pub fn load(&self) -> BoardResult<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut f = OpenOptions::new().read(true).open(&self.path)?;
        let mut s = String::new();
        f.read_to_string(&mut s)?;
        if s.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&s).map_err(|e| BoardError::PersistenceRead(e.to_string()))
    }

    /// Reads the snapshot, treating any failure as "no saved data".
    pub fn load_or_default(&self) -> Vec<Task> {
        match self.load() {
            Ok(tasks) => {
                debug!(path = %self.path.display(), count = tasks.len(), "tasks loaded");
                tasks
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring saved tasks");
                Vec::new()
            }
        }
    }

    /// Overwrites the snapshot with `tasks`.
    pub fn save(&self, tasks: &[Task]) -> BoardResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let s = serde_json::to_string_pretty(tasks)?;
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        f.write_all(s.as_bytes())?;
        debug!(path = %self.path.display(), count = tasks.len(), "tasks saved");
        Ok(())
    }
}
