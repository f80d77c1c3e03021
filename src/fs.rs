//! Filesystem helpers: atomic writes and content hashing.

use std::io::Write;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::VaultupResult;

/// Write content to a file atomically
///
/// Uses tempfile + rename in the target directory so readers never observe
/// a partially written file.
pub fn atomic_write(path: &Path, content: &str) -> VaultupResult<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Compute SHA-256 hash of raw content
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{:x}", hasher.finalize())
}

/// Compute SHA-256 hash of a file, or `None` when it does not exist
pub fn hash_file(path: &Path) -> VaultupResult<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read(path)?;
    Ok(Some(hash_content(&content)))
}

/// Remove a file if present; reports whether anything was removed
pub fn remove_file_if_exists(path: &Path) -> VaultupResult<bool> {
    if path.exists() {
        std::fs::remove_file(path)?;
        return Ok(true);
    }
    Ok(false)
}

/// Remove a directory tree if present; reports whether anything was removed
pub fn remove_dir_if_exists(path: &Path) -> VaultupResult<bool> {
    if path.exists() {
        std::fs::remove_dir_all(path)?;
        return Ok(true);
    }
    Ok(false)
}
