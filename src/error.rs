//! Error types for vaultup
//!
//! Uses `thiserror` for library errors; the binary wraps these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vaultup operations
pub type VaultupResult<T> = Result<T, VaultupError>;

/// Main error type for vaultup operations
#[derive(Error, Debug)]
pub enum VaultupError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Compose declaration serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Invalid project configuration file
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Running without the privileges the hosts file / trust store need
    #[error("elevated privileges required: {detail}")]
    PrivilegeRequired { detail: String },

    /// The orchestrator CLI does not support the compose interface
    #[error("docker compose is not available: {detail}")]
    ComposeUnavailable { detail: String },

    /// A preflight check other than privileges/compose failed
    #[error("preflight check '{check}' failed: {detail}")]
    PreflightFailed { check: String, detail: String },

    /// An external command exited non-zero
    #[error("command `{program}` failed with status {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: i32,
        stderr: String,
    },

    /// Certificate tooling failed; provisioning must not continue
    #[error("certificate {stage} failed: {detail}")]
    CertGeneration { stage: String, detail: String },

    /// Another vaultup process holds the workflow lock
    #[error("another vaultup instance holds the lock at {path}")]
    LockHeld { path: PathBuf },

    /// Workflow was aborted before mutating anything
    #[error("aborted by user")]
    Aborted,
}
