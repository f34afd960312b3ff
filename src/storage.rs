//! Device-local blob storage backing the notification queue.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::PushResult;

/// A single persisted string slot. The queue rewrites it wholesale.
pub trait QueueStorage: Send + Sync {
    /// `None` when nothing has been stored yet.
    fn read(&self) -> PushResult<Option<String>>;
    fn write(&self, blob: &str) -> PushResult<()>;
    fn clear(&self) -> PushResult<()>;
}

/// JSON file in the app data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl QueueStorage for FileStorage {
    fn read(&self) -> PushResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, blob: &str) -> PushResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write beside the target and rename so readers never see half a file.
        let staging = self.staging_path();
        fs::write(&staging, blob)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> PushResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process slot, used where nothing needs to survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(blob: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(blob.into())),
        }
    }
}

impl QueueStorage for MemoryStorage {
    fn read(&self) -> PushResult<Option<String>> {
        Ok(self.slot.lock().clone())
    }

    fn write(&self, blob: &str) -> PushResult<()> {
        *self.slot.lock() = Some(blob.to_string());
        Ok(())
    }

    fn clear(&self) -> PushResult<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}
