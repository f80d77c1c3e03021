//! Container orchestration: compose declaration model and lifecycle control.
//!
//! The service declaration is rendered from a typed model rather than a
//! string template so the generated YAML always parses. Lifecycle itself is
//! fully delegated to `docker compose` through the [`CommandRunner`] seam.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::VAULT_CONTAINER_PORT;
use crate::error::VaultupResult;
use crate::exec::CommandRunner;

/// Name of the single declared service
pub const SERVICE_NAME: &str = "vault";

/// Container name, fixed so repeated runs reuse the same container
pub const CONTAINER_NAME: &str = "vault-dev";

/// Top-level compose declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeFile {
    pub services: BTreeMap<String, Service>,
}

/// One declared service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub image: String,
    pub container_name: String,
    pub ports: Vec<String>,
    pub cap_add: Vec<String>,
    pub volumes: Vec<String>,
    pub environment: Vec<String>,
    pub command: String,
    pub restart: String,
    pub healthcheck: HealthCheck,
}

/// Container health probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub test: Vec<String>,
    pub interval: String,
    pub retries: u32,
}

/// Build the declaration for the dev instance.
///
/// Image and host port stay as `${VAR}` references resolved by compose from
/// the environment file, so the declaration survives version bumps.
pub fn service_definition() -> ComposeFile {
    let service = Service {
        image: "${VAULT_IMAGE}".to_string(),
        container_name: CONTAINER_NAME.to_string(),
        ports: vec![format!("${{VAULT_PORT}}:{VAULT_CONTAINER_PORT}")],
        cap_add: vec!["IPC_LOCK".to_string()],
        volumes: vec![
            "./vault:/vault/config".to_string(),
            "./certs:/vault/certs:ro".to_string(),
            "./vault-data:/vault/data".to_string(),
        ],
        environment: vec![
            format!("VAULT_ADDR=https://127.0.0.1:{VAULT_CONTAINER_PORT}"),
            "VAULT_CACERT=/vault/certs/vault.crt".to_string(),
        ],
        command: "vault server -config=/vault/config/vault.hcl".to_string(),
        restart: "unless-stopped".to_string(),
        healthcheck: HealthCheck {
            test: vec![
                "CMD".to_string(),
                "vault".to_string(),
                "status".to_string(),
                "-tls-skip-verify".to_string(),
            ],
            interval: "10s".to_string(),
            retries: 5,
        },
    };
    let mut services = BTreeMap::new();
    services.insert(SERVICE_NAME.to_string(), service);
    ComposeFile { services }
}

/// Render the declaration to YAML
pub fn render() -> VaultupResult<String> {
    Ok(serde_yaml_ng::to_string(&service_definition())?)
}

/// Thin wrapper over `docker compose` for the declared service
pub struct ComposeController<'a, R: CommandRunner> {
    runner: &'a R,
    compose_file: PathBuf,
    env_file: PathBuf,
}

impl<'a, R: CommandRunner> ComposeController<'a, R> {
    pub fn new(runner: &'a R, compose_file: PathBuf, env_file: PathBuf) -> Self {
        Self {
            runner,
            compose_file,
            env_file,
        }
    }

    fn base_args(&self) -> Vec<String> {
        let mut args = vec!["compose".to_string()];
        if self.env_file.exists() {
            args.push("--env-file".to_string());
            args.push(self.env_file.to_string_lossy().into_owned());
        }
        args.push("-f".to_string());
        args.push(self.compose_file.to_string_lossy().into_owned());
        args
    }

    fn run_compose(&self, tail: &[&str]) -> VaultupResult<()> {
        let mut args = self.base_args();
        args.extend(tail.iter().map(|a| a.to_string()));
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner.run_checked("docker", &arg_refs)?;
        Ok(())
    }

    /// Whether the orchestrator CLI supports the compose interface
    pub fn is_supported(&self) -> bool {
        self.runner.is_available("docker", &["compose", "version"])
    }

    /// Declarative apply, detached
    pub fn up(&self) -> VaultupResult<()> {
        self.run_compose(&["up", "-d"])
    }

    /// Teardown, removing orphaned resources.
    ///
    /// Returns `Ok(false)` when no declaration file exists; that is a skip
    /// for the caller, not an error.
    pub fn down(&self) -> VaultupResult<bool> {
        if !self.compose_file.exists() {
            return Ok(false);
        }
        self.run_compose(&["down", "--remove-orphans"])?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::ScriptedRunner;
    use tempfile::tempdir;

    #[test]
    fn rendered_declaration_parses_back() {
        let rendered = render().unwrap();
        let parsed: ComposeFile = serde_yaml_ng::from_str(&rendered).unwrap();

        let service = &parsed.services[SERVICE_NAME];
        assert_eq!(service.image, "${VAULT_IMAGE}");
        assert_eq!(service.ports, vec!["${VAULT_PORT}:8200"]);
        assert_eq!(service.healthcheck.interval, "10s");
        assert_eq!(service.healthcheck.retries, 5);
        assert_eq!(service.healthcheck.test[0], "CMD");
    }

    #[test]
    fn declaration_mounts_certs_read_only() {
        let file = service_definition();
        let service = &file.services[SERVICE_NAME];
        assert!(service.volumes.contains(&"./certs:/vault/certs:ro".to_string()));
        assert!(service.volumes.contains(&"./vault-data:/vault/data".to_string()));
    }

    #[test]
    fn up_invokes_detached_apply() {
        let dir = tempdir().unwrap();
        let compose_file = dir.path().join("docker-compose.yml");
        let env_file = dir.path().join(".env");
        std::fs::write(&compose_file, "services: {}\n").unwrap();
        std::fs::write(&env_file, "VAULT_PORT=8200\n").unwrap();

        let runner = ScriptedRunner::new();
        let controller = ComposeController::new(&runner, compose_file, env_file);
        controller.up().unwrap();

        let calls = runner.calls_for("docker");
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call[1], "compose");
        assert!(call.contains(&"--env-file".to_string()));
        assert_eq!(call[call.len() - 2], "up");
        assert_eq!(call[call.len() - 1], "-d");
    }

    #[test]
    fn down_skips_when_declaration_missing() {
        let dir = tempdir().unwrap();
        let runner = ScriptedRunner::new();
        let controller = ComposeController::new(
            &runner,
            dir.path().join("docker-compose.yml"),
            dir.path().join(".env"),
        );

        assert!(!controller.down().unwrap());
        assert_eq!(runner.count("docker"), 0);
    }

    #[test]
    fn down_removes_orphans() {
        let dir = tempdir().unwrap();
        let compose_file = dir.path().join("docker-compose.yml");
        std::fs::write(&compose_file, "services: {}\n").unwrap();

        let runner = ScriptedRunner::new();
        let controller = ComposeController::new(&runner, compose_file, dir.path().join(".env"));
        assert!(controller.down().unwrap());

        let call = &runner.calls_for("docker")[0];
        assert!(call.contains(&"down".to_string()));
        assert!(call.contains(&"--remove-orphans".to_string()));
    }
}
