//! Private copies of databases owned by other processes.
//!
//! The OS keeps its SQLite stores open (often in WAL mode); querying them in
//! place contends for locks. Each probe copies the database and its sidecar
//! files into its own temporary directory, queries the copy, and the
//! directory is removed when the `DbCopy` is dropped.
//!
//! A probe abandoned at the collection deadline may never drop its copy, so
//! every copy directory is also tracked in the run's `CopyRegistry`, which
//! the collector sweeps once the join is over.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, OpenFlags};
use tempfile::TempDir;
use tracing::debug;

use super::probe::ProbeError;

const SIDECAR_SUFFIXES: [&str; 2] = ["-wal", "-shm"];

#[derive(Debug, Default)]
struct RegistryState {
    live: Vec<PathBuf>,
    swept: bool,
}

/// Copy directories still on disk for one collection run.
#[derive(Debug, Clone, Default)]
pub struct CopyRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl CopyRegistry {
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records `dir`; refused once the registry has been swept.
    fn track(&self, dir: &Path) -> Result<(), ProbeError> {
        let mut state = self.lock();
        if state.swept {
            return Err(ProbeError::Cancelled);
        }
        state.live.push(dir.to_path_buf());
        Ok(())
    }

    fn release(&self, dir: &Path) {
        self.lock().live.retain(|live| live != dir);
    }

    /// Removes every copy directory still on disk and refuses new copies.
    /// Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let mut state = self.lock();
        state.swept = true;
        let mut removed = 0;
        for dir in state.live.drain(..) {
            match fs::remove_dir_all(&dir) {
                Ok(()) => removed += 1,
                Err(e) => debug!("Could not remove {}: {}", dir.display(), e),
            }
        }
        removed
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }
}

pub struct DbCopy {
    path: PathBuf,
    dir: Option<TempDir>,
    registry: CopyRegistry,
}

impl DbCopy {
    pub fn of(source: &Path, registry: &CopyRegistry) -> Result<Self, ProbeError> {
        if !source.exists() {
            return Err(ProbeError::unavailable(format!(
                "{} not found",
                source.display()
            )));
        }

        let dir = tempfile::Builder::new()
            .prefix("daytrace-")
            .tempdir()
            .map_err(|e| ProbeError::unavailable(format!("temporary directory: {e}")))?;
        registry.track(dir.path())?;
        let copy = Self {
            path: PathBuf::new(),
            dir: Some(dir),
            registry: registry.clone(),
        };
        copy.fill(source)
    }

    fn fill(mut self, source: &Path) -> Result<Self, ProbeError> {
        let Some(dir) = self.dir.as_ref() else {
            return Err(ProbeError::Cancelled);
        };

        let file_name = source
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("db"));
        let path = dir.path().join(&file_name);

        fs::copy(source, &path).map_err(|e| {
            ProbeError::unavailable(format!("cannot read {}: {}", source.display(), e))
        })?;

        for suffix in SIDECAR_SUFFIXES {
            let sidecar = with_suffix(source, suffix);
            if sidecar.exists() {
                if let Err(e) = fs::copy(&sidecar, with_suffix(&path, suffix)) {
                    debug!("Skipping {}: {}", sidecar.display(), e);
                }
            }
        }

        self.path = path;
        Ok(self)
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_ref().map(TempDir::path)
    }

    pub fn open(&self) -> Result<Connection, ProbeError> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            ProbeError::unavailable(format!("cannot open {}: {}", self.path.display(), e))
        })
    }
}

impl Drop for DbCopy {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = dir.path().to_path_buf();
        if let Err(e) = dir.close() {
            debug!("Could not remove {}: {}", path.display(), e);
        }
        self.registry.release(&path);
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}
