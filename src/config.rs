//! Configuration for vaultup
//!
//! Layering (highest priority first):
//! 1. Environment variables (VAULTUP_*)
//! 2. Project config (vaultup.toml)
//! 3. Built-in defaults
//!
//! The image reference and host port are additionally externalized into the
//! rendered `.env` file so the compose declaration can survive minor version
//! bumps without being edited.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{VaultupError, VaultupResult};

/// Port Vault listens on inside the container
pub const VAULT_CONTAINER_PORT: u16 = 8200;

/// Settings controlling what gets provisioned and where
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Development hostname registered in the hosts file and certificate
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Host port mapped to the container listener
    #[serde(default = "default_host_port")]
    pub host_port: u16,

    /// Image reference written to the environment file
    #[serde(default = "default_image")]
    pub image: String,

    /// Hosts file the registrar edits
    #[serde(default = "default_hosts_path")]
    pub hosts_path: PathBuf,

    /// Prefix prepended to trust-store paths. `/` targets the real system.
    #[serde(default = "default_trust_root")]
    pub trust_root: PathBuf,

    /// Numeric `uid:gid` applied to the data directory
    #[serde(default = "default_data_owner")]
    pub data_owner: String,
}

fn default_hostname() -> String {
    "vault.local".to_string()
}

fn default_host_port() -> u16 {
    VAULT_CONTAINER_PORT
}

fn default_image() -> String {
    "hashicorp/vault:1.15".to_string()
}

fn default_hosts_path() -> PathBuf {
    PathBuf::from("/etc/hosts")
}

fn default_trust_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_data_owner() -> String {
    "100:1000".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            host_port: default_host_port(),
            image: default_image(),
            hosts_path: default_hosts_path(),
            trust_root: default_trust_root(),
            data_owner: default_data_owner(),
        }
    }
}

impl Settings {
    pub const FILE_NAME: &'static str = "vaultup.toml";

    /// Load settings for a project directory: `vaultup.toml` when present,
    /// then environment overrides on top.
    pub fn load(project_root: &Path) -> VaultupResult<Self> {
        let path = project_root.join(Self::FILE_NAME);
        let mut settings = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content).map_err(|e| VaultupError::InvalidConfig {
                file: path.clone(),
                message: e.to_string(),
            })?
        } else {
            Self::default()
        };
        settings.apply_env_overrides();
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("VAULTUP_HOSTNAME") {
            if !v.is_empty() {
                self.hostname = v;
            }
        }
        if let Ok(v) = env::var("VAULTUP_PORT") {
            if let Ok(port) = v.parse() {
                self.host_port = port;
            }
        }
        if let Ok(v) = env::var("VAULTUP_IMAGE") {
            if !v.is_empty() {
                self.image = v;
            }
        }
        if let Ok(v) = env::var("VAULTUP_HOSTS_FILE") {
            if !v.is_empty() {
                self.hosts_path = PathBuf::from(v);
            }
        }
        if let Ok(v) = env::var("VAULTUP_TRUST_ROOT") {
            if !v.is_empty() {
                self.trust_root = PathBuf::from(v);
            }
        }
    }

    /// True when the registrar targets the real system hosts file
    pub fn uses_system_hosts(&self) -> bool {
        self.hosts_path == Path::new("/etc/hosts")
    }

    /// True when trust-store paths resolve under the real filesystem root
    pub fn uses_system_trust_root(&self) -> bool {
        self.trust_root == Path::new("/")
    }
}
