//! Vaultup - local Vault dev environment provisioner
//!
//! Vaultup bootstraps a self-signed-TLS HashiCorp Vault instance for local
//! development: it materializes the project layout and configuration files,
//! generates certificate material, registers the dev hostname in the hosts
//! file and the OS trust store, and starts the container via docker compose.
//! The teardown workflow reverses every one of those steps.

pub mod certs;
pub mod compose;
pub mod config;
pub mod error;
pub mod exec;
pub mod fs;
pub mod hosts;
pub mod layout;
pub mod lock;
pub mod preflight;
pub mod provision;
pub mod teardown;
pub mod truststore;
pub mod workflow;

// Re-exports for convenience
pub use certs::{CertGenerator, GeneratedCert};
pub use compose::ComposeController;
pub use config::Settings;
pub use error::{VaultupError, VaultupResult};
pub use exec::{CommandOutput, CommandRunner, ShellRunner};
pub use hosts::{EnsureEntry, HostsFile, RemoveEntry};
pub use layout::ProjectLayout;
pub use lock::WorkflowLock;
pub use preflight::{ensure_ready, run_preflight, CheckStatus, PreflightMode, PreflightReport};
pub use provision::ProvisionWorkflow;
pub use teardown::TeardownWorkflow;
pub use truststore::{detect_trust_store, TrustOutcome, TrustStore};
pub use workflow::{StepOutcome, StepReport, WorkflowReport};
