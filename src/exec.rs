//! External command execution.
//!
//! Every mutation vaultup performs outside its own project directory goes
//! through an external tool (`openssl`, `docker`, `chown`, the trust-store
//! refresh tools). `CommandRunner` is the single seam for those invocations
//! so workflow logic can be exercised against a recording fake.

use std::process::{Command, Stdio};

use crate::error::{VaultupError, VaultupResult};

/// Captured result of an external command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Abstract command execution interface
pub trait CommandRunner {
    /// Run a program with arguments, capturing output.
    ///
    /// Returns `Err` only when the program could not be spawned; a non-zero
    /// exit is reported through [`CommandOutput::status`].
    fn run(&self, program: &str, args: &[&str]) -> VaultupResult<CommandOutput>;

    /// Run and map a non-zero exit into [`VaultupError::CommandFailed`].
    fn run_checked(&self, program: &str, args: &[&str]) -> VaultupResult<CommandOutput> {
        let output = self.run(program, args)?;
        if output.success() {
            Ok(output)
        } else {
            Err(VaultupError::CommandFailed {
                program: program.to_string(),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }

    /// Availability probe: does the tool run and exit zero?
    fn is_available(&self, program: &str, args: &[&str]) -> bool {
        self.run(program, args).map(|o| o.success()).unwrap_or(false)
    }
}

/// Runner backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, program: &str, args: &[&str]) -> VaultupResult<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;
        let status = output
            .status
            .code()
            .unwrap_or(if output.status.success() { 0 } else { 1 });
        Ok(CommandOutput {
            status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_runner_captures_exit_status() {
        let runner = ShellRunner::new();
        let output = runner.run("sh", &["-c", "exit 3"]).unwrap();
        assert_eq!(output.status, 3);
        assert!(!output.success());
    }

    #[test]
    fn shell_runner_captures_stdout() {
        let runner = ShellRunner::new();
        let output = runner.run("sh", &["-c", "echo hello"]).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn run_checked_maps_nonzero_to_error() {
        let runner = testing::ScriptedRunner::failing(&["docker"]);
        let err = runner.run_checked("docker", &["compose", "up"]).unwrap_err();
        assert!(err.to_string().contains("docker"));
    }

    #[test]
    fn is_available_swallows_spawn_errors() {
        let runner = ShellRunner::new();
        assert!(!runner.is_available("definitely-not-a-real-tool-xyz", &["--version"]));
    }
}
