//! Command execution seam
//!
//! Both external collaborators (the analysis engine CLI and the `cf` CLI)
//! are driven through shell commands whose line-oriented output gets
//! scraped. `CommandRunner` abstracts the spawn so the wrappers can be
//! tested against canned transcripts.

use std::io;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Captured output of one shell command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Whether the command exited with status zero
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout, for tests.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given stderr, for tests.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Command execution errors
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn command: {0}")]
    Spawn(#[from] io::Error),

    #[error("command output was not valid UTF-8")]
    InvalidOutput,
}

/// Interface for running shell commands.
pub trait CommandRunner {
    /// Run a command line and capture its output.
    fn run(&self, command: &str) -> Result<CommandOutput, ExecError>;
}

/// Real runner: spawns `sh -c <command>` with piped stdio.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandOutput, ExecError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        let stdout = String::from_utf8(output.stdout).map_err(|_| ExecError::InvalidOutput)?;
        let stderr = String::from_utf8(output.stderr).map_err(|_| ExecError::InvalidOutput)?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout,
            stderr,
        })
    }
}
