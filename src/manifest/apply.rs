//! Fetching declared dependencies
//!
//! Entries are processed in declaration order and independently: a failed
//! clone is recorded against its entry and the next entry still runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::entry::{Manifest, ManifestEntry};
use crate::error::{Result, ScaffoldError};
use crate::installer::{self, DependencyOutcome, Installer};
use crate::process::{display_command, CommandRunner};

/// Retrieves one entry's pinned revision into `dest`
pub trait Fetcher {
    fn fetch(&self, entry: &ManifestEntry, dest: &Path) -> Result<()>;
}

/// Clones (or updates) with the `git` binary
pub struct GitFetcher<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> GitFetcher<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn git(&self, args: &[&str], cwd: Option<&Path>) -> Result<()> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let out = self.runner.run("git", &args, cwd)?;
        if out.success() {
            return Ok(());
        }
        Err(ScaffoldError::Collaborator(format!(
            "{} failed ({}): {}",
            display_command("git", &args),
            out.status_label(),
            out.combined()
        )))
    }
}

impl Fetcher for GitFetcher<'_> {
    fn fetch(&self, entry: &ManifestEntry, dest: &Path) -> Result<()> {
        let dest_str = dest.display().to_string();
        if dest.join(".git").exists() {
            self.git(&["-C", &dest_str, "fetch", "--tags", "--quiet", "origin"], None)?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            self.git(&["clone", "--quiet", &entry.repo, &dest_str], None)?;
        }
        self.git(&["-C", &dest_str, "checkout", "--quiet", "--force", &entry.rev], None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FetchStatus {
    Fetched,
    Failed { cause: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchResult {
    pub name: String,
    pub repo: String,
    pub rev: String,
    pub path: PathBuf,
    pub status: FetchStatus,
}

impl FetchResult {
    pub fn is_ok(&self) -> bool {
        self.status == FetchStatus::Fetched
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStatus {
    /// Nothing declared
    Empty,
    Complete,
    Partial,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub fetched: Vec<FetchResult>,
    pub installed: Vec<DependencyOutcome>,
}

impl ApplyReport {
    pub fn status(&self) -> ApplyStatus {
        let failed = self.failed_count();
        match (self.fetched.len(), failed) {
            (0, _) => ApplyStatus::Empty,
            (_, 0) => ApplyStatus::Complete,
            (total, f) if f == total => ApplyStatus::Failed,
            _ => ApplyStatus::Partial,
        }
    }

    pub fn failed_count(&self) -> usize {
        self.fetched.iter().filter(|r| !r.is_ok()).count()
    }

    /// Fetch failures always fail the run; install failures only without `force`
    pub fn into_result(self, force: bool) -> Result<Self> {
        let failed = self.failed_count();
        if failed > 0 {
            return Err(ScaffoldError::FetchFailure {
                failed,
                total: self.fetched.len(),
            });
        }
        installer::resolve(&self.installed, force)?;
        Ok(self)
    }
}

/// Fetch every entry of `manifest` under `root/<location>/<name>`
pub fn apply(manifest: &Manifest, root: &Path, fetcher: &dyn Fetcher) -> ApplyReport {
    let base = root.join(&manifest.location);
    let mut report = ApplyReport::default();

    for entry in &manifest.sources {
        let path = base.join(&entry.name);
        let status = match fetcher.fetch(entry, &path) {
            Ok(()) => {
                tracing::info!(name = %entry.name, rev = %entry.rev, "dependency fetched");
                FetchStatus::Fetched
            }
            Err(e) => {
                tracing::warn!(name = %entry.name, repo = %entry.repo, error = %e, "dependency fetch failed");
                FetchStatus::Failed { cause: e.to_string() }
            }
        };
        report.fetched.push(FetchResult {
            name: entry.name.clone(),
            repo: entry.repo.clone(),
            rev: entry.rev.clone(),
            path,
            status,
        });
    }
    report
}

/// Run the installer in every successfully fetched dependency
pub fn install_fetched(report: &mut ApplyReport, installer: &Installer<'_>) {
    let outcomes: Vec<DependencyOutcome> = report
        .fetched
        .iter()
        .filter(|r| r.is_ok())
        .map(|r| installer.install_named(&r.name, &r.path))
        .collect();
    report.installed = outcomes;
}
