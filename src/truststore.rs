//! Trust-store adapter.
//!
//! Adding a certificate to the machine-wide trusted roots is fundamentally
//! OS-specific, so each supported family gets its own adapter behind one
//! trait; everything else falls back to a variant that only tells the
//! operator what to do manually. The adapter is selected once, by probing
//! for each family's CA directory under the trust root.

use std::path::{Path, PathBuf};

use crate::error::VaultupResult;
use crate::exec::CommandRunner;

/// What a trust-store operation actually did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustOutcome {
    /// Certificate copied/removed and the refresh tool ran
    Applied,
    /// Nothing to do (certificate already absent on removal)
    Skipped,
    /// No automatic mechanism; the operator must run the given command
    Manual(String),
}

/// OS-family specific trust-store operations
pub trait TrustStore {
    /// Short family name for reporting
    fn name(&self) -> &'static str;

    /// Register the certificate with the machine-wide trust store
    fn install(&self, runner: &dyn CommandRunner, cert: &Path) -> VaultupResult<TrustOutcome>;

    /// Remove a previously registered certificate.
    ///
    /// An absent certificate file is a silent skip, not an error.
    fn remove(&self, runner: &dyn CommandRunner) -> VaultupResult<TrustOutcome>;
}

/// Debian/Ubuntu family: local CA directory plus `update-ca-certificates`
pub struct DebianTrustStore {
    anchor: PathBuf,
}

impl DebianTrustStore {
    pub const CA_DIR: &'static str = "usr/local/share/ca-certificates";
    const REFRESH_TOOL: &'static str = "update-ca-certificates";

    pub fn new(trust_root: &Path, hostname: &str) -> Self {
        Self {
            anchor: trust_root.join(Self::CA_DIR).join(format!("{hostname}.crt")),
        }
    }

    pub fn anchor_path(&self) -> &Path {
        &self.anchor
    }
}

impl TrustStore for DebianTrustStore {
    fn name(&self) -> &'static str {
        "debian"
    }

    fn install(&self, runner: &dyn CommandRunner, cert: &Path) -> VaultupResult<TrustOutcome> {
        std::fs::copy(cert, &self.anchor)?;
        runner.run_checked(Self::REFRESH_TOOL, &[])?;
        Ok(TrustOutcome::Applied)
    }

    fn remove(&self, runner: &dyn CommandRunner) -> VaultupResult<TrustOutcome> {
        if !self.anchor.exists() {
            return Ok(TrustOutcome::Skipped);
        }
        std::fs::remove_file(&self.anchor)?;
        runner.run_checked(Self::REFRESH_TOOL, &["--fresh"])?;
        Ok(TrustOutcome::Applied)
    }
}

/// RHEL/Fedora family: anchors directory plus `update-ca-trust extract`
pub struct RhelTrustStore {
    anchor: PathBuf,
}

impl RhelTrustStore {
    pub const CA_DIR: &'static str = "etc/pki/ca-trust/source/anchors";
    const REFRESH_TOOL: &'static str = "update-ca-trust";

    pub fn new(trust_root: &Path, hostname: &str) -> Self {
        Self {
            anchor: trust_root.join(Self::CA_DIR).join(format!("{hostname}.crt")),
        }
    }

    pub fn anchor_path(&self) -> &Path {
        &self.anchor
    }
}

impl TrustStore for RhelTrustStore {
    fn name(&self) -> &'static str {
        "rhel"
    }

    fn install(&self, runner: &dyn CommandRunner, cert: &Path) -> VaultupResult<TrustOutcome> {
        std::fs::copy(cert, &self.anchor)?;
        runner.run_checked(Self::REFRESH_TOOL, &["extract"])?;
        Ok(TrustOutcome::Applied)
    }

    fn remove(&self, runner: &dyn CommandRunner) -> VaultupResult<TrustOutcome> {
        if !self.anchor.exists() {
            return Ok(TrustOutcome::Skipped);
        }
        std::fs::remove_file(&self.anchor)?;
        runner.run_checked(Self::REFRESH_TOOL, &["extract"])?;
        Ok(TrustOutcome::Applied)
    }
}

/// macOS: keychain automation is out of scope, surface the exact command
pub struct DarwinTrustStore {
    hostname: String,
}

impl DarwinTrustStore {
    pub fn new(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
        }
    }
}

impl TrustStore for DarwinTrustStore {
    fn name(&self) -> &'static str {
        "darwin"
    }

    fn install(&self, _runner: &dyn CommandRunner, cert: &Path) -> VaultupResult<TrustOutcome> {
        Ok(TrustOutcome::Manual(format!(
            "sudo security add-trusted-cert -d -r trustRoot -k /Library/Keychains/System.keychain {}",
            cert.display()
        )))
    }

    fn remove(&self, _runner: &dyn CommandRunner) -> VaultupResult<TrustOutcome> {
        Ok(TrustOutcome::Manual(format!(
            "sudo security delete-certificate -c {}",
            self.hostname
        )))
    }
}

/// Fallback for everything else: no filesystem writes, manual note only
pub struct UnsupportedTrustStore;

impl TrustStore for UnsupportedTrustStore {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn install(&self, _runner: &dyn CommandRunner, cert: &Path) -> VaultupResult<TrustOutcome> {
        Ok(TrustOutcome::Manual(format!(
            "add {} to your system trust store manually",
            cert.display()
        )))
    }

    fn remove(&self, _runner: &dyn CommandRunner) -> VaultupResult<TrustOutcome> {
        Ok(TrustOutcome::Manual(
            "remove the certificate from your system trust store manually".to_string(),
        ))
    }
}

/// Pick the adapter for this machine.
///
/// macOS is decided at compile time since keychain automation is out of
/// scope either way; Linux families are probed through their CA directory
/// under the trust root.
pub fn detect_trust_store(trust_root: &Path, hostname: &str) -> Box<dyn TrustStore> {
    if cfg!(target_os = "macos") {
        return Box::new(DarwinTrustStore::new(hostname));
    }
    if trust_root.join(DebianTrustStore::CA_DIR).is_dir() {
        return Box::new(DebianTrustStore::new(trust_root, hostname));
    }
    if trust_root.join(RhelTrustStore::CA_DIR).is_dir() {
        return Box::new(RhelTrustStore::new(trust_root, hostname));
    }
    Box::new(UnsupportedTrustStore)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::ScriptedRunner;
    use tempfile::tempdir;

    fn write_cert(dir: &Path) -> PathBuf {
        let cert = dir.join("vault.crt");
        std::fs::write(&cert, "-----BEGIN CERTIFICATE-----\n").unwrap();
        cert
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn detect_prefers_debian_layout() {
        let root = tempdir().unwrap();
        std::fs::create_dir_all(root.path().join(DebianTrustStore::CA_DIR)).unwrap();

        let store = detect_trust_store(root.path(), "vault.local");
        assert_eq!(store.name(), "debian");
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn detect_falls_back_to_unsupported() {
        let root = tempdir().unwrap();
        let store = detect_trust_store(root.path(), "vault.local");
        assert_eq!(store.name(), "unsupported");
    }

    #[test]
    fn debian_install_copies_and_refreshes() {
        let root = tempdir().unwrap();
        std::fs::create_dir_all(root.path().join(DebianTrustStore::CA_DIR)).unwrap();
        let cert = write_cert(root.path());
        let runner = ScriptedRunner::new();

        let store = DebianTrustStore::new(root.path(), "vault.local");
        let outcome = store.install(&runner, &cert).unwrap();

        assert_eq!(outcome, TrustOutcome::Applied);
        assert!(store.anchor_path().is_file());
        assert_eq!(runner.count("update-ca-certificates"), 1);
    }

    #[test]
    fn debian_remove_absent_anchor_is_skip() {
        let root = tempdir().unwrap();
        std::fs::create_dir_all(root.path().join(DebianTrustStore::CA_DIR)).unwrap();
        let runner = ScriptedRunner::new();

        let store = DebianTrustStore::new(root.path(), "vault.local");
        assert_eq!(store.remove(&runner).unwrap(), TrustOutcome::Skipped);
        assert_eq!(runner.count("update-ca-certificates"), 0);
    }

    #[test]
    fn rhel_install_targets_anchor_dir() {
        let root = tempdir().unwrap();
        std::fs::create_dir_all(root.path().join(RhelTrustStore::CA_DIR)).unwrap();
        let cert = write_cert(root.path());
        let runner = ScriptedRunner::new();

        let store = RhelTrustStore::new(root.path(), "vault.local");
        store.install(&runner, &cert).unwrap();

        assert!(root
            .path()
            .join("etc/pki/ca-trust/source/anchors/vault.local.crt")
            .is_file());
        let call = &runner.calls_for("update-ca-trust")[0];
        assert_eq!(call[1], "extract");
    }

    #[test]
    fn unsupported_store_never_touches_disk() {
        let root = tempdir().unwrap();
        let cert = write_cert(root.path());
        let runner = ScriptedRunner::new();

        let outcome = UnsupportedTrustStore.install(&runner, &cert).unwrap();

        assert!(matches!(outcome, TrustOutcome::Manual(_)));
        assert_eq!(runner.calls.borrow().len(), 0);
        // only the certificate itself exists under the root
        let entries: Vec<_> = std::fs::read_dir(root.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn darwin_surfaces_keychain_command() {
        let runner = ScriptedRunner::new();
        let store = DarwinTrustStore::new("vault.local");

        match store.install(&runner, Path::new("certs/vault.crt")).unwrap() {
            TrustOutcome::Manual(cmd) => {
                assert!(cmd.contains("security add-trusted-cert"));
                assert!(cmd.contains("certs/vault.crt"));
            }
            other => panic!("expected manual outcome, got {other:?}"),
        }
    }
}
