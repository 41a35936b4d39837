//! # File Snapshot Store
//!
//! Durable [`RegistryStore`] backed by a single snapshot file.
//!
//! ```text
//! <data_dir>/
//!   LOCK                 exclusive fs2 lock, held for the store's lifetime
//!   registry.snapshot    current snapshot (see `codec` for the layout)
//!   registry.tmp         staging file, renamed over the snapshot on commit
//! ```
//!
//! Only one process may open a data directory at a time.

use crate::adapters::codec::{decode_snapshot, encode_snapshot};
use crate::domain::entities::RegistryState;
use crate::errors::StoreError;
use crate::ports::outbound::{LoadedState, RegistryStore};
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const SNAPSHOT_FILE: &str = "registry.snapshot";
const STAGING_FILE: &str = "registry.tmp";

fn io_error(path: &Path, err: &io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Snapshot store rooted at a data directory.
pub struct FileSnapshotStore {
    dir: PathBuf,
    snapshot_path: PathBuf,
    // Serializes writers inside this process; the flock covers other processes.
    write_guard: Mutex<()>,
    // Keeps the directory lock alive until drop.
    lock_file: File,
}

impl FileSnapshotStore {
    /// Opens (creating if needed) the data directory and locks it.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Locked`] if another process holds the directory
    /// - [`StoreError::Io`] if the directory or lock file cannot be created
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, &e))?;

        let lock_path = dir.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| io_error(&lock_path, &e))?;

        if lock_file.try_lock_exclusive().is_err() {
            tracing::warn!(path = %lock_path.display(), "data directory already locked");
            return Err(StoreError::Locked { path: lock_path });
        }

        // The holder's pid is only rewritten once the lock is ours.
        let mut lock_file = lock_file;
        lock_file.set_len(0).map_err(|e| io_error(&lock_path, &e))?;
        writeln!(lock_file, "{}", std::process::id()).map_err(|e| io_error(&lock_path, &e))?;

        let snapshot_path = dir.join(SNAPSHOT_FILE);
        match fs::metadata(&snapshot_path) {
            Ok(metadata) => tracing::info!(
                path = %snapshot_path.display(),
                bytes = metadata.len(),
                "found existing registry snapshot"
            ),
            Err(_) => tracing::info!(path = %dir.display(), "no registry snapshot yet"),
        }

        Ok(Self {
            dir,
            snapshot_path,
            write_guard: Mutex::new(()),
            lock_file,
        })
    }

    /// The data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot file.
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Writes raw snapshot bytes atomically (staging file, fsync, rename).
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if any step fails; the previous snapshot survives.
    pub fn write_raw(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let _guard = self.write_guard.lock();
        let staging = self.dir.join(STAGING_FILE);

        let mut file = File::create(&staging).map_err(|e| io_error(&staging, &e))?;
        file.write_all(bytes).map_err(|e| io_error(&staging, &e))?;
        file.sync_all().map_err(|e| io_error(&staging, &e))?;

        fs::rename(&staging, &self.snapshot_path).map_err(|e| io_error(&self.snapshot_path, &e))
    }
}

impl RegistryStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<LoadedState>, StoreError> {
        let bytes = match fs::read(&self.snapshot_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&self.snapshot_path, &e)),
        };
        let loaded = decode_snapshot(&bytes)?;
        tracing::info!(
            agents = loaded.state.agents.len(),
            upgraded_from = ?loaded.upgraded_from,
            "loaded registry snapshot"
        );
        Ok(Some(loaded))
    }

    fn persist(&self, state: &RegistryState) -> Result<(), StoreError> {
        let bytes = encode_snapshot(state)?;
        self.write_raw(&bytes)
    }
}

impl Drop for FileSnapshotStore {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.lock_file);
    }
}
