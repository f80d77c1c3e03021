//! Hosts-file registrar.
//!
//! Maintains the single loopback mapping for the dev hostname. Matching is
//! by whitespace-delimited token, so an entry for `myvault.local` never
//! counts as a match for `vault.local`. Lines that do not mention the
//! hostname are preserved byte-for-byte.

use std::net::ToSocketAddrs;
use std::path::{Path, PathBuf};

use crate::error::VaultupResult;
use crate::fs::atomic_write;

pub const LOOPBACK: &str = "127.0.0.1";

/// Outcome of the registration edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureEntry {
    Added,
    AlreadyPresent,
}

/// Outcome of the de-registration edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveEntry {
    Removed,
    NotFound,
}

/// A hosts file at a known location
#[derive(Debug, Clone)]
pub struct HostsFile {
    path: PathBuf,
}

impl HostsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The canonical line the registrar appends
    pub fn entry_line(hostname: &str) -> String {
        format!("{LOOPBACK} {hostname}")
    }

    fn read(&self) -> VaultupResult<String> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        Ok(std::fs::read_to_string(&self.path)?)
    }

    fn line_matches(line: &str, hostname: &str) -> bool {
        let data = line.split('#').next().unwrap_or("");
        data.split_whitespace().any(|token| token == hostname)
    }

    /// Whether any line already carries the hostname
    pub fn has_entry(&self, hostname: &str) -> VaultupResult<bool> {
        Ok(self
            .read()?
            .lines()
            .any(|line| Self::line_matches(line, hostname)))
    }

    /// Append the loopback mapping unless a line for the hostname exists
    pub fn ensure_entry(&self, hostname: &str) -> VaultupResult<EnsureEntry> {
        let content = self.read()?;
        if content.lines().any(|line| Self::line_matches(line, hostname)) {
            return Ok(EnsureEntry::AlreadyPresent);
        }
        let mut updated = content;
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push_str(&Self::entry_line(hostname));
        updated.push('\n');
        atomic_write(&self.path, &updated)?;
        Ok(EnsureEntry::Added)
    }

    /// Delete every line carrying the hostname; absence is a no-op
    pub fn remove_entry(&self, hostname: &str) -> VaultupResult<RemoveEntry> {
        let content = self.read()?;
        if !content.lines().any(|line| Self::line_matches(line, hostname)) {
            return Ok(RemoveEntry::NotFound);
        }
        let updated: String = content
            .split_inclusive('\n')
            .filter(|line| !Self::line_matches(line.trim_end(), hostname))
            .collect();
        atomic_write(&self.path, &updated)?;
        Ok(RemoveEntry::Removed)
    }
}

/// Resolve the hostname through the system resolver.
///
/// Used as a post-registration self-check; a `false` here is a warning for
/// the caller (local resolver caching can lag the hosts file), never fatal.
pub fn resolves(hostname: &str, port: u16) -> bool {
    (hostname, port)
        .to_socket_addrs()
        .map(|mut addrs| addrs.next().is_some())
        .unwrap_or(false)
}
