//! Per-dependency Python package installation
//!
//! Each fetched dependency goes through detect, probe, install and resolve.
//! Nothing here returns early on a failed install: the outcome is recorded
//! and the caller decides, through [`resolve`], whether the run as a whole
//! fails.

mod probe;
mod requirements;

pub use probe::{
    parse_pip_version, Capabilities, CapabilityProbe, FixedCapabilities, PipVersionProbe,
    SystemPackages, BREAK_SYSTEM_PACKAGES_SINCE,
};
pub use requirements::{parse_requirements, read_requirements};

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::REQUIREMENTS_FILE;
use crate::error::{Result, ScaffoldError};
use crate::process::{display_command, CommandRunner};

pub const DEFAULT_PIP: &str = "pip3";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InstallOutcome {
    Skipped { reason: String },
    Installed { packages: usize },
    Failed {
        command: String,
        status: String,
        output: String,
    },
}

impl InstallOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, InstallOutcome::Failed { .. })
    }

    /// What the user can run by hand to finish the job
    pub fn remediation(&self) -> Option<String> {
        match self {
            InstallOutcome::Failed { command, .. } => {
                Some(format!("Run manually inside the container: {}", command))
            }
            _ => None,
        }
    }
}

/// Outcome for one named dependency directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyOutcome {
    pub name: String,
    pub dir: PathBuf,
    pub outcome: InstallOutcome,
}

pub struct Installer<'a> {
    runner: &'a dyn CommandRunner,
    probe: Box<dyn CapabilityProbe>,
    pip: String,
    capabilities: OnceCell<Capabilities>,
}

impl<'a> Installer<'a> {
    pub fn new(runner: &'a dyn CommandRunner, probe: Box<dyn CapabilityProbe>) -> Self {
        Self {
            runner,
            probe,
            pip: DEFAULT_PIP.to_string(),
            capabilities: OnceCell::new(),
        }
    }

    pub fn with_pip(mut self, pip: impl Into<String>) -> Self {
        self.pip = pip.into();
        self
    }

    /// Probed once per installer and reused for every dependency
    pub fn capabilities(&self) -> Capabilities {
        *self
            .capabilities
            .get_or_init(|| self.probe.detect(self.runner, &self.pip))
    }

    fn install_args(&self, requirements: &Path) -> Vec<String> {
        let mut args = vec![
            "install".to_string(),
            "--no-cache-dir".to_string(),
            "-r".to_string(),
            requirements.display().to_string(),
        ];
        if self.capabilities().break_system_packages {
            args.push("--break-system-packages".to_string());
        }
        args
    }

    pub fn install(&self, dir: &Path) -> InstallOutcome {
        let path = dir.join(REQUIREMENTS_FILE);

        let packages = match read_requirements(&path) {
            Ok(None) => {
                return InstallOutcome::Skipped {
                    reason: format!("no {}", REQUIREMENTS_FILE),
                }
            }
            Ok(Some(lines)) if lines.is_empty() => {
                return InstallOutcome::Skipped {
                    reason: format!("{} lists no packages", REQUIREMENTS_FILE),
                }
            }
            Ok(Some(lines)) => lines.len(),
            Err(e) => {
                return InstallOutcome::Failed {
                    command: format!("cat {}", path.display()),
                    status: "unreadable".to_string(),
                    output: e.to_string(),
                }
            }
        };

        let args = self.install_args(&path);
        let command = display_command(&self.pip, &args);
        tracing::info!(dir = %dir.display(), packages, "installing python requirements");

        match self.runner.run(&self.pip, &args, Some(dir)) {
            Ok(out) if out.success() => InstallOutcome::Installed { packages },
            Ok(out) => {
                tracing::warn!(
                    dir = %dir.display(),
                    status = %out.status_label(),
                    output = %out.combined(),
                    "requirement installation failed"
                );
                InstallOutcome::Failed {
                    command,
                    status: out.status_label(),
                    output: out.combined(),
                }
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "could not run package installer");
                InstallOutcome::Failed {
                    command,
                    status: "not started".to_string(),
                    output: e.to_string(),
                }
            }
        }
    }

    pub fn install_named(&self, name: &str, dir: &Path) -> DependencyOutcome {
        DependencyOutcome {
            name: name.to_string(),
            dir: dir.to_path_buf(),
            outcome: self.install(dir),
        }
    }
}

/// Turn the collected outcomes into the run's result.
///
/// Failures fail the run unless `force` is set, in which case they are
/// only logged. Either way every failure has already been reported.
pub fn resolve(outcomes: &[DependencyOutcome], force: bool) -> Result<()> {
    let failed: Vec<String> = outcomes
        .iter()
        .filter(|o| o.outcome.is_failed())
        .map(|o| o.name.clone())
        .collect();

    if failed.is_empty() {
        return Ok(());
    }
    if force {
        tracing::warn!(failed = %failed.join(", "), "continuing despite failed installs");
        return Ok(());
    }
    Err(ScaffoldError::DependencyInstall(failed))
}
