//! Single-instance guard.
//!
//! The hosts file, trust store, and project tree are mutated with no
//! coordination against other processes; two concurrent vaultup runs over
//! the same project are undefined. The workflow lock turns that into a
//! fast, explicit failure instead.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{VaultupError, VaultupResult};

pub const LOCK_FILE: &str = ".vaultup.lock";

/// Exclusive advisory lock held for the duration of a workflow
#[derive(Debug)]
pub struct WorkflowLock {
    file: File,
    path: PathBuf,
}

impl WorkflowLock {
    /// Acquire the lock in `project_root`, failing fast when another
    /// instance already holds it.
    pub fn acquire(project_root: &Path) -> VaultupResult<Self> {
        let path = project_root.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        file.try_lock_exclusive()
            .map_err(|_| VaultupError::LockHeld { path: path.clone() })?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkflowLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
