//! Subprocess execution for external collaborators (git, pip)
//!
//! Fetching and installing never talk to the OS directly; they go through a
//! `CommandRunner` so the per-entry isolation logic can be exercised without
//! a network or a Python toolchain.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Result, ScaffoldError};

/// Captured result of one external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// stdout followed by stderr, trimmed
    pub fn combined(&self) -> String {
        let mut out = String::new();
        out.push_str(self.stdout.trim_end());
        if !self.stderr.trim().is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(self.stderr.trim_end());
        }
        out
    }

    /// Short description of the exit status for messages
    pub fn status_label(&self) -> String {
        match self.status {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs a program to completion and captures its output.
///
/// An `Err` means the program could not be started at all; a non-zero exit
/// is reported through `CommandOutput::status`.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<CommandOutput>;
}

/// Runs commands on the host, resolving the program on `PATH`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<CommandOutput> {
        let bin = which::which(program).map_err(|_| {
            ScaffoldError::Collaborator(format!("'{}' not found in PATH", program))
        })?;

        let mut cmd = Command::new(bin);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        tracing::debug!(program, ?args, cwd = ?cwd, "running external command");

        let output = cmd.output().map_err(|e| {
            ScaffoldError::Collaborator(format!("failed to start {}: {}", program, e))
        })?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Render a command line for remediation messages
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        if arg.contains(' ') {
            line.push_str(&format!("\"{}\"", arg));
        } else {
            line.push_str(arg);
        }
    }
    line
}
