//! Package installer capability detection
//!
//! Newer pip releases refuse to install into an interpreter marked as
//! externally managed unless told to. Whether that override may be passed
//! is asked of the installer itself rather than inferred from a hard-coded
//! platform version.

use crate::process::CommandRunner;

/// pip learned `--break-system-packages` in 23.0.1
pub const BREAK_SYSTEM_PACKAGES_SINCE: (u32, u32, u32) = (23, 0, 1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub break_system_packages: bool,
}

pub trait CapabilityProbe {
    fn detect(&self, runner: &dyn CommandRunner, pip: &str) -> Capabilities;
}

/// Asks `pip --version` and compares against the first release with the override flag
#[derive(Debug, Default, Clone, Copy)]
pub struct PipVersionProbe;

impl CapabilityProbe for PipVersionProbe {
    fn detect(&self, runner: &dyn CommandRunner, pip: &str) -> Capabilities {
        let output = match runner.run(pip, &["--version".to_string()], None) {
            Ok(out) if out.success() => out,
            Ok(out) => {
                tracing::debug!(status = %out.status_label(), "pip --version failed");
                return Capabilities::default();
            }
            Err(e) => {
                tracing::debug!(error = %e, "could not query pip version");
                return Capabilities::default();
            }
        };

        let version = parse_pip_version(&output.stdout);
        tracing::debug!(?version, "detected pip version");
        Capabilities {
            break_system_packages: version.is_some_and(|v| v >= BREAK_SYSTEM_PACKAGES_SINCE),
        }
    }
}

/// Capabilities forced from the command line
#[derive(Debug, Clone, Copy)]
pub struct FixedCapabilities(pub Capabilities);

impl CapabilityProbe for FixedCapabilities {
    fn detect(&self, _runner: &dyn CommandRunner, _pip: &str) -> Capabilities {
        self.0
    }
}

/// How to decide on `--break-system-packages`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SystemPackages {
    /// Ask the installer which flags it understands
    #[default]
    Auto,
    Always,
    Never,
}

impl SystemPackages {
    pub fn probe(self) -> Box<dyn CapabilityProbe> {
        match self {
            SystemPackages::Auto => Box::new(PipVersionProbe),
            SystemPackages::Always => Box::new(FixedCapabilities(Capabilities {
                break_system_packages: true,
            })),
            SystemPackages::Never => Box::new(FixedCapabilities(Capabilities::default())),
        }
    }
}

/// `pip 23.0.1 from /usr/lib/python3/dist-packages/pip (python 3.11)` -> (23, 0, 1)
pub fn parse_pip_version(text: &str) -> Option<(u32, u32, u32)> {
    let raw = text.split_whitespace().nth(1)?;
    let mut parts = raw.split('.').map(|p| {
        let digits: String = p.chars().take_while(char::is_ascii_digit).collect();
        digits.parse::<u32>().ok()
    });
    let major = parts.next().flatten()?;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);
    Some((major, minor, patch))
}
