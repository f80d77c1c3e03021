//! Preflight checks: verify the execution environment before mutating it.
//!
//! Follows the fatal/best-effort split of the workflows: missing privileges
//! or a missing compose interface stop provisioning outright, a missing
//! companion CLI is only worth a warning. Teardown downgrades the compose
//! check so cleanup can still make progress on a machine where docker has
//! already been removed.

use std::fmt;

use crate::config::Settings;
use crate::error::{VaultupError, VaultupResult};
use crate::exec::CommandRunner;

/// Which workflow the checks are gating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreflightMode {
    Provision,
    Teardown,
}

/// Status of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warning,
    Error,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "✓"),
            CheckStatus::Warning => write!(f, "⚠"),
            CheckStatus::Error => write!(f, "✗"),
        }
    }
}

/// A single check result
#[derive(Debug, Clone, PartialEq)]
pub struct PreflightCheck {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub recommendation: Option<String>,
}

/// Preflight results
#[derive(Debug, Clone, Default)]
pub struct PreflightReport {
    pub checks: Vec<PreflightCheck>,
}

impl PreflightReport {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn add_pass(&mut self, name: &str, message: &str) {
        self.checks.push(PreflightCheck {
            name: name.to_string(),
            status: CheckStatus::Pass,
            message: message.to_string(),
            recommendation: None,
        });
    }

    pub fn add_warning(&mut self, name: &str, message: &str, recommendation: Option<&str>) {
        self.checks.push(PreflightCheck {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            recommendation: recommendation.map(String::from),
        });
    }

    pub fn add_error(&mut self, name: &str, message: &str, recommendation: Option<&str>) {
        self.checks.push(PreflightCheck {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            recommendation: recommendation.map(String::from),
        });
    }

    pub fn passes(&self) -> usize {
        self.count(CheckStatus::Pass)
    }

    pub fn warnings(&self) -> usize {
        self.count(CheckStatus::Warning)
    }

    pub fn errors(&self) -> usize {
        self.count(CheckStatus::Error)
    }

    pub fn is_success(&self) -> bool {
        self.errors() == 0
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }
}

/// Run every check for the given workflow
pub fn run_preflight(
    runner: &dyn CommandRunner,
    settings: &Settings,
    mode: PreflightMode,
) -> PreflightReport {
    let mut report = PreflightReport::new();
    check_privileges(runner, settings, &mut report);
    check_compose(runner, mode, &mut report);
    check_vault_cli(runner, &mut report);
    report
}

/// Convert the first error in a report into its typed failure
pub fn ensure_ready(report: &PreflightReport) -> VaultupResult<()> {
    for check in &report.checks {
        if check.status == CheckStatus::Error {
            return Err(match check.name.as_str() {
                "privileges" => VaultupError::PrivilegeRequired {
                    detail: check.message.clone(),
                },
                "compose" => VaultupError::ComposeUnavailable {
                    detail: check.message.clone(),
                },
                _ => VaultupError::PreflightFailed {
                    check: check.name.clone(),
                    detail: check.message.clone(),
                },
            });
        }
    }
    Ok(())
}

fn check_privileges(runner: &dyn CommandRunner, settings: &Settings, report: &mut PreflightReport) {
    if !settings.uses_system_hosts() && !settings.uses_system_trust_root() {
        report.add_pass(
            "privileges",
            "hosts file and trust root overridden; root not required",
        );
        return;
    }
    let is_root = runner
        .run("id", &["-u"])
        .map(|o| o.success() && o.stdout.trim() == "0")
        .unwrap_or(false);
    if is_root {
        report.add_pass("privileges", "running as root");
    } else {
        report.add_error(
            "privileges",
            "root privileges are required to edit the hosts file and trust store",
            Some("Re-run with sudo"),
        );
    }
}

fn check_compose(runner: &dyn CommandRunner, mode: PreflightMode, report: &mut PreflightReport) {
    if runner.is_available("docker", &["compose", "version"]) {
        report.add_pass("compose", "docker compose is available");
        return;
    }
    match mode {
        PreflightMode::Provision => report.add_error(
            "compose",
            "docker compose v2 is required",
            Some("Install Docker with the compose plugin"),
        ),
        PreflightMode::Teardown => report.add_warning(
            "compose",
            "docker compose not available; container teardown will be skipped",
            None,
        ),
    }
}

fn check_vault_cli(runner: &dyn CommandRunner, report: &mut PreflightReport) {
    if runner.is_available("vault", &["version"]) {
        report.add_pass("vault-cli", "vault CLI found");
    } else {
        report.add_warning(
            "vault-cli",
            "vault CLI not found; init/unseal must run inside the container",
            Some("Install the vault CLI for post-setup operations"),
        );
    }
}
