//! Common test utilities for vaultup integration tests.
//!
//! Provides:
//! - `TestEnv`: isolated project directory with hosts-file and trust-root
//!   overrides wired through the environment, plus CLI execution helpers
//! - `RecordingRunner`: a `CommandRunner` fake that records every argv and
//!   fabricates `-out` files so downstream steps can proceed

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;

use tempfile::TempDir;
use vaultup::{CommandOutput, CommandRunner, VaultupResult};

/// Result of running the vaultup CLI
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated test environment.
///
/// The hosts file lives outside the project directory so round-trip
/// assertions can check that the project tree ends up empty.
pub struct TestEnv {
    pub project_root: TempDir,
    pub state_root: TempDir,
    pub hosts_file: PathBuf,
    bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let project_root = TempDir::new().unwrap();
        let state_root = TempDir::new().unwrap();
        let hosts_file = state_root.path().join("hosts");
        std::fs::write(&hosts_file, "127.0.0.1 localhost\n").unwrap();
        Self {
            project_root,
            state_root,
            hosts_file,
            bin: PathBuf::from(env!("CARGO_BIN_EXE_vaultup")),
        }
    }

    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    pub fn trust_root(&self) -> PathBuf {
        self.state_root.path().join("trust")
    }

    /// Run vaultup in this environment from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        let output = Command::new(&self.bin)
            .current_dir(self.project_root.path())
            .args(args)
            .env("VAULTUP_HOSTS_FILE", &self.hosts_file)
            .env("VAULTUP_TRUST_ROOT", self.trust_root())
            .stdin(Stdio::null())
            .output()
            .expect("failed to execute vaultup");

        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Recording fake for library-level workflow tests.
///
/// Programs listed via `fail_on` exit 1; `id -u` answers `0`; `openssl`
/// invocations create a placeholder file at their `-out` path so later
/// steps (trust install) find the certificate on disk.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Vec<String>>>,
    failures: Mutex<Vec<String>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, program: &str) {
        self.failures.lock().unwrap().push(program.to_string());
    }

    pub fn calls_for(&self, program: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c[0] == program)
            .cloned()
            .collect()
    }

    pub fn count(&self, program: &str) -> usize {
        self.calls_for(program).len()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[&str]) -> VaultupResult<CommandOutput> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().map(|a| a.to_string()));
        self.calls.lock().unwrap().push(call);

        if self.failures.lock().unwrap().iter().any(|p| p == program) {
            return Ok(CommandOutput {
                status: 1,
                stdout: String::new(),
                stderr: "simulated failure".to_string(),
            });
        }

        if program == "openssl" {
            if let Some(pos) = args.iter().position(|a| *a == "-out") {
                let path = Path::new(args[pos + 1]);
                std::fs::write(path, "-----BEGIN PLACEHOLDER-----\n")?;
            }
        }

        let stdout = if program == "id" {
            "0\n".to_string()
        } else {
            String::new()
        };
        Ok(CommandOutput {
            status: 0,
            stdout,
            stderr: String::new(),
        })
    }
}
