//! Manifest file model (gitman-compatible YAML)

use std::fs;
use std::path::{Component, Path};

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::config::EXTERNAL_ADDONS_DIR;
use crate::error::{Result, ScaffoldError};
use crate::persist::write_atomic;

/// Revisions that would move under the user's feet
const FLOATING_REVISIONS: &[&str] = &["latest", "head", "*"];

/// Script gitman runs inside each fetched source
pub const INSTALL_SCRIPT: &str = "rocketdoo install-deps --force";

fn default_location() -> String {
    EXTERNAL_ADDONS_DIR.to_string()
}

fn default_kind() -> String {
    "git".to_string()
}

/// Accept `rev: 17.0` as well as `rev: "17.0"`
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar, found {:?}",
            other
        ))),
    }
}

/// One external dependency: where it comes from, which pinned revision,
/// and which directory (under the manifest location) it lands in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub repo: String,
    /// Target path relative to the manifest location
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub rev: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub scripts: Vec<String>,
}

impl ManifestEntry {
    pub fn new(repo: &str, rev: &str, name: &str) -> Result<Self> {
        let entry = Self {
            repo: repo.trim().to_string(),
            name: name.trim().trim_end_matches('/').to_string(),
            rev: rev.trim().to_string(),
            kind: default_kind(),
            scripts: vec![INSTALL_SCRIPT.to_string()],
        };
        entry.validate()?;
        Ok(entry)
    }

    pub fn validate(&self) -> Result<()> {
        if self.repo.is_empty() {
            return Err(ScaffoldError::InvalidEntry("repository locator is empty".to_string()));
        }
        if self.rev.is_empty() {
            return Err(ScaffoldError::InvalidEntry(format!(
                "'{}' has no revision; pin a branch, tag or commit",
                self.name
            )));
        }
        if FLOATING_REVISIONS.contains(&self.rev.to_lowercase().as_str()) {
            return Err(ScaffoldError::InvalidEntry(format!(
                "'{}' uses floating revision '{}'; pin a branch, tag or commit",
                self.name, self.rev
            )));
        }
        validate_target(&self.name)
    }
}

/// Targets are plain relative paths that stay inside the manifest location
fn validate_target(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ScaffoldError::InvalidEntry("target path is empty".to_string()));
    }
    if name.contains('\\') || name.contains(',') {
        return Err(ScaffoldError::InvalidEntry(format!(
            "target path '{}' contains an invalid character",
            name
        )));
    }
    let safe = Path::new(name)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return Err(ScaffoldError::InvalidEntry(format!(
            "target path '{}' must be relative and must not contain '..'",
            name
        )));
    }
    Ok(())
}

/// Default target for a repository: last URL segment, `.git` stripped, dashes as underscores.
///
/// `https://github.com/ingadhoc/odoo-argentina.git` -> `odoo_argentina`
pub fn repo_name_from_url(url: &str) -> String {
    let last = url
        .trim()
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or_default();
    last.strip_suffix(".git").unwrap_or(last).replace('-', "_")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub sources: Vec<ManifestEntry>,
    #[serde(default)]
    pub default_group: String,
    #[serde(default)]
    pub groups: Vec<Value>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            location: default_location(),
            sources: Vec::new(),
            default_group: String::new(),
            groups: Vec::new(),
        }
    }
}

impl Manifest {
    /// A missing file is an empty manifest
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let manifest: Manifest = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&text)?
        };
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_yaml()?.as_bytes())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        validate_target(&self.location)?;
        for (i, entry) in self.sources.iter().enumerate() {
            entry.validate()?;
            if self.sources[..i].iter().any(|e| e.name == entry.name) {
                return Err(ScaffoldError::DuplicateTarget(entry.name.clone()));
            }
        }
        Ok(())
    }

    pub fn contains(&self, target: &str) -> bool {
        self.sources.iter().any(|e| e.name == target)
    }

    pub fn get(&self, target: &str) -> Option<&ManifestEntry> {
        self.sources.iter().find(|e| e.name == target)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
