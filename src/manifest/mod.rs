//! Dependency manifest
//!
//! The manifest (`gitman.yml`) is the single source of truth for external
//! addon repositories. Adding or removing an entry rewrites the manifest
//! and recomputes the `addons_path` line of `odoo.conf`; both files are
//! committed together inside a critical section.

mod addons;
mod apply;
mod entry;

pub use addons::{read_addons_path, rewrite_addons_path, AddonsLayout};
pub use apply::{
    apply, install_fetched, ApplyReport, ApplyStatus, FetchResult, FetchStatus, Fetcher,
    GitFetcher,
};
pub use entry::{repo_name_from_url, Manifest, ManifestEntry, INSTALL_SCRIPT};

use std::fs;

use crate::config::{ProjectPaths, ODOO_CONF_FILE};
use crate::error::{Result, ScaffoldError};
use crate::interrupt::CriticalSection;
use crate::persist::write_all_atomic;

pub struct ManifestApplier {
    paths: ProjectPaths,
    layout: AddonsLayout,
}

impl ManifestApplier {
    pub fn new(paths: ProjectPaths, layout: AddonsLayout) -> Self {
        Self { paths, layout }
    }

    pub fn load(&self) -> Result<Manifest> {
        Manifest::load(&self.paths.manifest())
    }

    /// Declare a new dependency. The target must not already be declared.
    pub fn add_entry(&self, repo: &str, rev: &str, target: Option<&str>) -> Result<Manifest> {
        let mut manifest = self.load()?;
        let name = match target {
            Some(t) => t.to_string(),
            None => repo_name_from_url(repo),
        };
        let entry = ManifestEntry::new(repo, rev, &name)?;
        if manifest.contains(&entry.name) {
            return Err(ScaffoldError::DuplicateTarget(entry.name));
        }
        tracing::info!(name = %entry.name, repo = %entry.repo, rev = %entry.rev, "adding dependency");
        manifest.sources.push(entry);
        self.commit(&manifest)?;
        Ok(manifest)
    }

    pub fn remove_entry(&self, target: &str) -> Result<Manifest> {
        let mut manifest = self.load()?;
        let before = manifest.len();
        manifest.sources.retain(|e| e.name != target);
        if manifest.len() == before {
            return Err(ScaffoldError::InvalidEntry(format!(
                "no dependency named '{}' in the manifest",
                target
            )));
        }
        tracing::info!(name = %target, "removing dependency");
        self.commit(&manifest)?;
        Ok(manifest)
    }

    /// Recompute `addons_path` from the manifest as it is on disk
    pub fn sync(&self) -> Result<Manifest> {
        let manifest = self.load()?;
        self.commit(&manifest)?;
        Ok(manifest)
    }

    pub fn addons_path(&self, manifest: &Manifest) -> String {
        self.layout.addons_path_value(manifest)
    }

    fn commit(&self, manifest: &Manifest) -> Result<()> {
        let conf_path = self.paths.odoo_conf();
        if !conf_path.is_file() {
            return Err(ScaffoldError::Config(format!(
                "{} not found. Run 'rocketdoo init' first",
                ODOO_CONF_FILE
            )));
        }
        let conf = fs::read_to_string(&conf_path)?;
        let updated = rewrite_addons_path(&conf, &self.addons_path(manifest));
        let yaml = manifest.to_yaml()?;

        let section = CriticalSection::enter();
        write_all_atomic([
            (self.paths.manifest(), yaml.as_bytes()),
            (conf_path, updated.as_bytes()),
        ])?;
        section.finish()
    }
}
