//! Teardown workflow.
//!
//! Reverses provisioning: container down, generated files, hosts entry,
//! trust registration. Every step is best-effort so cleanup makes maximum
//! forward progress even when some resource is already gone; only failing
//! to take the workflow lock aborts.

use std::path::{Path, PathBuf};

use crate::compose::ComposeController;
use crate::config::Settings;
use crate::error::VaultupResult;
use crate::exec::CommandRunner;
use crate::hosts::{HostsFile, RemoveEntry};
use crate::layout::ProjectLayout;
use crate::lock::WorkflowLock;
use crate::truststore::{detect_trust_store, TrustOutcome};
use crate::workflow::{StepOutcome, WorkflowReport};

/// Removes everything provisioning created
pub struct TeardownWorkflow<'a, R: CommandRunner> {
    runner: &'a R,
    root: PathBuf,
    settings: Settings,
}

impl<'a, R: CommandRunner> TeardownWorkflow<'a, R> {
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
            "stop container",
            "remove generated files",
            "remove hosts entry",
            "remove trust-store registration",
        ]
    }

    pub fn execute(&self) -> VaultupResult<WorkflowReport> {
        let _lock = WorkflowLock::acquire(&self.root)?;
        let mut report = WorkflowReport::new();
        let layout = ProjectLayout::new(&self.root, &self.settings);

        let controller = ComposeController::new(
            self.runner,
            layout.compose_file_path(),
            layout.env_file_path(),
        );
        let outcome = match controller.down() {
            Ok(true) => StepOutcome::Done("docker compose down --remove-orphans".to_string()),
            Ok(false) => StepOutcome::Skipped("no compose declaration present".to_string()),
            Err(e) => StepOutcome::Warned(format!("compose down failed: {e}; continuing")),
        };
        report.push("stop container", outcome);

        let outcome = match layout.remove() {
            Ok(removal) => StepOutcome::Done(removal.summary()),
            Err(e) => StepOutcome::Warned(format!("could not remove some paths: {e}")),
        };
        report.push("remove generated files", outcome);

        let hosts_file = HostsFile::new(&self.settings.hosts_path);
        let outcome = match hosts_file.remove_entry(&self.settings.hostname) {
            Ok(RemoveEntry::Removed) => StepOutcome::Done(format!(
                "removed {} from {}",
                self.settings.hostname,
                hosts_file.path().display()
            )),
            Ok(RemoveEntry::NotFound) => {
                StepOutcome::Skipped("hosts entry not found".to_string())
            }
            Err(e) => StepOutcome::Warned(format!("could not edit hosts file: {e}")),
        };
        report.push("remove hosts entry", outcome);

        let store = detect_trust_store(&self.settings.trust_root, &self.settings.hostname);
        let outcome = match store.remove(self.runner_dyn()) {
            Ok(TrustOutcome::Applied) => {
                StepOutcome::Done(format!("{} trust store updated", store.name()))
            }
            Ok(TrustOutcome::Skipped) => {
                StepOutcome::Skipped("certificate was not registered".to_string())
            }
            Ok(TrustOutcome::Manual(cmd)) => {
                StepOutcome::Warned(format!("manual trust step required: {cmd}"))
            }
            Err(e) => StepOutcome::Warned(format!("trust removal failed: {e}")),
        };
        report.push("remove trust-store registration", outcome);

        Ok(report)
    }

    fn runner_dyn(&self) -> &dyn CommandRunner {
        self.runner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::ScriptedRunner;
    use tempfile::tempdir;

    fn settings_for(dir: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.hosts_path = dir.join("hosts");
        settings.trust_root = dir.join("trust");
        settings
    }

    #[test]
    fn empty_project_tears_down_cleanly() {
        let dir = tempdir().unwrap();
        let runner = ScriptedRunner::new();
        let workflow = TeardownWorkflow::new(&runner, dir.path(), settings_for(dir.path()));

        let report = workflow.execute().unwrap();

        assert!(report.is_success());
        assert_eq!(runner.count("docker"), 0);
        let executed: Vec<&str> = report.steps.iter().map(|s| s.name).collect();
        assert_eq!(executed, workflow.plan());
    }

    #[test]
    fn compose_failure_does_not_stop_cleanup() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("docker-compose.yml"), "services: {}\n").unwrap();
        let runner = ScriptedRunner::failing(&["docker"]);
        let workflow = TeardownWorkflow::new(&runner, dir.path(), settings_for(dir.path()));

        let report = workflow.execute().unwrap();

        assert!(report.is_success());
        assert!(matches!(
            report.steps[0].outcome,
            StepOutcome::Warned(_)
        ));
        // the declaration file itself was still removed
        assert!(!dir.path().join("docker-compose.yml").exists());
    }
}
