//! Provisioning workflow.
//!
//! Linear sequence over external resources: project layout, certificate
//! material, hosts file, trust store, container. Fatal steps abort through
//! `?`; best-effort steps record a warning and the run continues.

use std::path::{Path, PathBuf};

use crate::certs::CertGenerator;
use crate::compose::ComposeController;
use crate::config::Settings;
use crate::error::VaultupResult;
use crate::exec::CommandRunner;
use crate::hosts::{self, EnsureEntry, HostsFile};
use crate::layout::ProjectLayout;
use crate::lock::WorkflowLock;
use crate::truststore::{detect_trust_store, TrustOutcome};
use crate::workflow::{StepOutcome, WorkflowReport};

/// Provisions the complete dev instance in a project directory
pub struct ProvisionWorkflow<'a, R: CommandRunner> {
    runner: &'a R,
    root: PathBuf,
    settings: Settings,
}

impl<'a, R: CommandRunner> ProvisionWorkflow<'a, R> {
    pub fn new(runner: &'a R, root: &Path, settings: Settings) -> Self {
        Self {
            runner,
            root: root.to_path_buf(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Step names in execution order, for previews and dry runs
    pub fn plan(&self) -> Vec<&'static str> {
        vec![
            "materialize project layout",
            "set data directory ownership",
            "generate certificate material",
            "register hosts entry",
            "register trust store",
            "start container",
            "verify hostname resolution",
        ]
    }

    /// Execute the workflow. Fatal failures (certificate tooling, container
    /// startup, layout writes) return `Err`; everything else lands in the
    /// report.
    pub fn execute(&self) -> VaultupResult<WorkflowReport> {
        let _lock = WorkflowLock::acquire(&self.root)?;
        let mut report = WorkflowReport::new();
        let layout = ProjectLayout::new(&self.root, &self.settings);

        let materialized = layout.materialize()?;
        report.push(
            "materialize project layout",
            StepOutcome::Done(materialized.summary()),
        );

        let data_dir = layout.data_dir();
        let data_dir_arg = data_dir.to_string_lossy().into_owned();
        let outcome = match self.runner.run_checked(
            "chown",
            &["-R", &self.settings.data_owner, &data_dir_arg],
        ) {
            Ok(_) => StepOutcome::Done(format!(
                "{} owned by {}",
                data_dir.display(),
                self.settings.data_owner
            )),
            Err(e) => StepOutcome::Warned(format!("could not set ownership: {e}")),
        };
        report.push("set data directory ownership", outcome);

        let generator = CertGenerator::new(
            self.runner,
            layout.cert_config_path(),
            layout.key_path(),
            layout.cert_path(),
        );
        let generated = generator.generate()?;
        report.push(
            "generate certificate material",
            StepOutcome::Done(format!(
                "{} valid until {}",
                generated.cert_path.display(),
                generated.not_after.format("%Y-%m-%d")
            )),
        );

        let hosts_file = HostsFile::new(&self.settings.hosts_path);
        let outcome = match hosts_file.ensure_entry(&self.settings.hostname)? {
            EnsureEntry::Added => StepOutcome::Done(format!(
                "added {} to {}",
                HostsFile::entry_line(&self.settings.hostname),
                hosts_file.path().display()
            )),
            EnsureEntry::AlreadyPresent => {
                StepOutcome::Skipped("hosts entry already present".to_string())
            }
        };
        report.push("register hosts entry", outcome);

        let store = detect_trust_store(&self.settings.trust_root, &self.settings.hostname);
        let outcome = match store.install(self.runner_dyn(), &layout.cert_path()) {
            Ok(TrustOutcome::Applied) => {
                StepOutcome::Done(format!("{} trust store updated", store.name()))
            }
            Ok(TrustOutcome::Manual(cmd)) => {
                StepOutcome::Warned(format!("manual trust step required: {cmd}"))
            }
            Ok(TrustOutcome::Skipped) => StepOutcome::Skipped("nothing to register".to_string()),
            Err(e) => StepOutcome::Warned(format!("trust registration failed: {e}")),
        };
        report.push("register trust store", outcome);

        let controller = ComposeController::new(
            self.runner,
            layout.compose_file_path(),
            layout.env_file_path(),
        );
        controller.up()?;
        report.push(
            "start container",
            StepOutcome::Done("docker compose up -d".to_string()),
        );

        let outcome = if hosts::resolves(&self.settings.hostname, self.settings.host_port) {
            StepOutcome::Done(format!("{} resolves", self.settings.hostname))
        } else {
            StepOutcome::Warned(format!(
                "{} does not resolve yet; local resolver caching may interfere",
                self.settings.hostname
            ))
        };
        report.push("verify hostname resolution", outcome);

        Ok(report)
    }

    fn runner_dyn(&self) -> &dyn CommandRunner {
        self.runner
    }
}
