//! Thin bridge to the container engine
//!
//! Lifecycle commands are forwarded to `docker` with inherited stdio so the
//! user sees the engine's own output; the exit status is passed through.

use std::process::Command;

use anyhow::{bail, Context};

use crate::config::{ProjectPaths, COMPOSE_FILE, DOCKERFILE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeAction {
    Up { detached: bool },
    Down { volumes: bool },
    Build { tag: Option<String> },
    Status,
    Logs { container: String, follow: bool },
    Stop,
    Pause,
}

impl ComposeAction {
    /// Arguments passed to `docker`
    pub fn argv(&self) -> Vec<String> {
        let mut args: Vec<&str> = Vec::new();
        match self {
            ComposeAction::Up { detached } => {
                args.extend(["compose", "up"]);
                if *detached {
                    args.push("-d");
                }
            }
            ComposeAction::Down { volumes } => {
                args.extend(["compose", "down"]);
                if *volumes {
                    args.push("-v");
                }
            }
            ComposeAction::Build { tag } => {
                args.push("build");
                if let Some(tag) = tag {
                    args.extend(["-t", tag.as_str()]);
                }
                args.push(".");
            }
            ComposeAction::Status => args.extend(["compose", "ps"]),
            ComposeAction::Logs { container, follow } => {
                args.push("logs");
                if *follow {
                    args.push("-f");
                }
                args.push(container.as_str());
            }
            ComposeAction::Stop => args.extend(["compose", "stop"]),
            ComposeAction::Pause => args.extend(["compose", "pause"]),
        }
        args.into_iter().map(String::from).collect()
    }

    fn needs_compose_file(&self) -> bool {
        !matches!(self, ComposeAction::Build { .. } | ComposeAction::Logs { .. })
    }
}

/// Run `action` in the project directory, returning the engine's exit code
pub fn run(action: &ComposeAction, paths: &ProjectPaths) -> anyhow::Result<i32> {
    let project_dir = paths.root();
    if action.needs_compose_file() && !paths.compose_file().is_file() {
        bail!(
            "no {} in {}. Run 'rocketdoo init' first",
            COMPOSE_FILE,
            project_dir.display()
        );
    }
    if matches!(action, ComposeAction::Build { .. }) && !paths.dockerfile().is_file() {
        bail!("no {} in {}. Run 'rocketdoo init' first", DOCKERFILE, project_dir.display());
    }

    let docker = which::which("docker").context("docker not found in PATH")?;
    let args = action.argv();
    tracing::debug!(docker = %docker.display(), ?args, "invoking container engine");

    let status = Command::new(&docker)
        .args(&args)
        .current_dir(project_dir)
        .status()
        .with_context(|| format!("failed to run docker {}", args.join(" ")))?;

    Ok(status.code().unwrap_or(1))
}
