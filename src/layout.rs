//! Project layout and configuration materializer.
//!
//! Renders the directory tree and the static configuration files for the
//! dev instance. Writes are atomic whole-file overwrites, so re-running
//! always resets configuration to the canonical content; files whose
//! content already matches are detected by hash and reported as unchanged.

use std::path::{Path, PathBuf};

use crate::compose;
use crate::config::{Settings, VAULT_CONTAINER_PORT};
use crate::error::VaultupResult;
use crate::fs::{atomic_write, hash_content, hash_file, remove_dir_if_exists, remove_file_if_exists};
use crate::lock::LOCK_FILE;

pub const CERTS_DIR: &str = "certs";
pub const CONFIG_DIR: &str = "vault";
pub const DATA_DIR: &str = "vault-data";
pub const CERT_CONFIG_FILE: &str = "vault-cert.cnf";
pub const SERVER_CONFIG_FILE: &str = "vault.hcl";
pub const ENV_FILE: &str = ".env";
pub const COMPOSE_FILE: &str = "docker-compose.yml";
pub const KEY_FILE: &str = "vault.key";
pub const CERT_FILE: &str = "vault.crt";

/// What materialization did, per path
#[derive(Debug, Clone, Default)]
pub struct MaterializeResult {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

impl MaterializeResult {
    pub fn summary(&self) -> String {
        format!(
            "{} written, {} unchanged",
            self.written.len(),
            self.unchanged.len()
        )
    }
}

/// What removal did, per path
#[derive(Debug, Clone, Default)]
pub struct RemovalResult {
    pub removed: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

impl RemovalResult {
    pub fn summary(&self) -> String {
        format!(
            "{} removed, {} already absent",
            self.removed.len(),
            self.missing.len()
        )
    }
}

/// The set of paths vaultup owns inside a project directory
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    settings: Settings,
}

impl ProjectLayout {
    pub fn new(root: &Path, settings: &Settings) -> Self {
        Self {
            root: root.to_path_buf(),
            settings: settings.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn certs_dir(&self) -> PathBuf {
        self.root.join(CERTS_DIR)
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join(CONFIG_DIR)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn cert_config_path(&self) -> PathBuf {
        self.root.join(CERT_CONFIG_FILE)
    }

    pub fn server_config_path(&self) -> PathBuf {
        self.config_dir().join(SERVER_CONFIG_FILE)
    }

    pub fn env_file_path(&self) -> PathBuf {
        self.root.join(ENV_FILE)
    }

    pub fn compose_file_path(&self) -> PathBuf {
        self.root.join(COMPOSE_FILE)
    }

    pub fn key_path(&self) -> PathBuf {
        self.certs_dir().join(KEY_FILE)
    }

    pub fn cert_path(&self) -> PathBuf {
        self.certs_dir().join(CERT_FILE)
    }

    /// Certificate request configuration consumed by the OpenSSL invocation
    pub fn render_cert_config(&self) -> String {
        let hostname = &self.settings.hostname;
        format!(
            "[req]\n\
             default_bits       = 2048\n\
             distinguished_name = req_distinguished_name\n\
             x509_extensions    = v3_req\n\
             prompt             = no\n\
             \n\
             [req_distinguished_name]\n\
             CN = {hostname}\n\
             \n\
             [v3_req]\n\
             basicConstraints = CA:FALSE\n\
             keyUsage         = digitalSignature, keyEncipherment\n\
             extendedKeyUsage = serverAuth\n\
             subjectAltName   = @alt_names\n\
             \n\
             [alt_names]\n\
             DNS.1 = {hostname}\n"
        )
    }

    /// Server listener/storage configuration mounted into the container
    pub fn render_server_config(&self) -> String {
        let hostname = &self.settings.hostname;
        let port = self.settings.host_port;
        format!(
            "ui = true\n\
             \n\
             listener \"tcp\" {{\n\
             \x20 address       = \"0.0.0.0:{VAULT_CONTAINER_PORT}\"\n\
             \x20 tls_cert_file = \"/vault/certs/vault.crt\"\n\
             \x20 tls_key_file  = \"/vault/certs/vault.key\"\n\
             }}\n\
             \n\
             storage \"file\" {{\n\
             \x20 path = \"/vault/data\"\n\
             }}\n\
             \n\
             api_addr = \"https://{hostname}:{port}\"\n"
        )
    }

    /// Environment file consumed by the compose invocation
    pub fn render_env_file(&self) -> String {
        format!(
            "# Consumed by docker compose; edit to pin a different image or port.\n\
             VAULT_IMAGE={}\n\
             VAULT_PORT={}\n",
            self.settings.image, self.settings.host_port
        )
    }

    /// Create the directory tree and write every configuration file.
    ///
    /// Whole-file overwrites; a file already carrying the canonical content
    /// is reported as unchanged instead of rewritten.
    pub fn materialize(&self) -> VaultupResult<MaterializeResult> {
        for dir in [self.certs_dir(), self.config_dir(), self.data_dir()] {
            std::fs::create_dir_all(&dir)?;
        }

        let files = [
            (self.cert_config_path(), self.render_cert_config()),
            (self.server_config_path(), self.render_server_config()),
            (self.env_file_path(), self.render_env_file()),
            (self.compose_file_path(), compose::render()?),
        ];

        let mut result = MaterializeResult::default();
        for (path, content) in files {
            if hash_file(&path)? == Some(hash_content(content.as_bytes())) {
                result.unchanged.push(path);
            } else {
                atomic_write(&path, &content)?;
                result.written.push(path);
            }
        }
        Ok(result)
    }

    /// Delete everything `materialize` and the certificate generator
    /// created, plus `.bak` strays editors may have left next to the
    /// generated files. Absent paths are reported, not errors.
    pub fn remove(&self) -> VaultupResult<RemovalResult> {
        let mut result = RemovalResult::default();

        let mut files = vec![
            self.cert_config_path(),
            self.env_file_path(),
            self.compose_file_path(),
        ];
        let strays: Vec<PathBuf> = files
            .iter()
            .map(|p| {
                let mut os = p.clone().into_os_string();
                os.push(".bak");
                PathBuf::from(os)
            })
            .collect();
        files.extend(strays);
        files.push(self.root.join(LOCK_FILE));

        for path in files {
            if remove_file_if_exists(&path)? {
                result.removed.push(path);
            } else {
                result.missing.push(path);
            }
        }

        for dir in [self.certs_dir(), self.config_dir(), self.data_dir()] {
            if remove_dir_if_exists(&dir)? {
                result.removed.push(dir);
            } else {
                result.missing.push(dir);
            }
        }

        Ok(result)
    }
}
