//! Private key discovery for private repositories
//!
//! The image build copies `./.ssh/<key>` from the project directory. Keys
//! already there are offered first; when there are none, the user's own
//! `~/.ssh` keys are offered and the chosen one is copied in.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScaffoldError};
use crate::persist::{write_atomic_with_mode, PersistMode};

/// Key directory, both in the project and in the user's home
pub const SSH_DIR: &str = ".ssh";

/// Files that live next to keys but are not keys
const NOT_KEYS: &[&str] = &["config", "known_hosts", "known_hosts.old", "authorized_keys", "environment"];

/// Private key file names in `dir`, sorted
pub fn private_keys(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut keys: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| !name.ends_with(".pub") && !name.starts_with('.') && !NOT_KEYS.contains(&name.as_str()))
        .collect();
    keys.sort();
    keys
}

/// Where a chosen key was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Project,
    Home,
}

#[derive(Debug, Clone)]
pub struct KeyCatalog {
    project_dir: PathBuf,
    home_dir: Option<PathBuf>,
    project: Vec<String>,
    home: Vec<String>,
}

impl KeyCatalog {
    pub fn discover(project_root: &Path, home_ssh: Option<PathBuf>) -> Self {
        let project_dir = project_root.join(SSH_DIR);
        let project = private_keys(&project_dir);
        let home = home_ssh.as_deref().map(private_keys).unwrap_or_default();
        Self {
            project_dir,
            home_dir: home_ssh,
            project,
            home,
        }
    }

    /// The user's `~/.ssh`, if a home directory is known
    pub fn user_ssh_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(SSH_DIR))
    }

    /// Keys to choose from: the project's own, or else the user's
    pub fn offered(&self) -> &[String] {
        if self.project.is_empty() {
            &self.home
        } else {
            &self.project
        }
    }

    pub fn locate(&self, key: &str) -> Option<KeySource> {
        if self.project_dir.join(key).is_file() {
            Some(KeySource::Project)
        } else if self.home_dir.as_ref().is_some_and(|d| d.join(key).is_file()) {
            Some(KeySource::Home)
        } else {
            None
        }
    }

    /// Check that `key` can end up in the build context
    pub fn require(&self, key: &str) -> Result<KeySource> {
        self.locate(key).ok_or_else(|| {
            ScaffoldError::validation(
                "ssh_key",
                format!(
                    "'{}' not found in {}; place the private key there before running init",
                    key,
                    self.project_dir.display()
                ),
            )
        })
    }

    /// Copy a key from the user's `~/.ssh` into the project, owner-only
    pub fn copy_into_project(&self, key: &str) -> Result<PathBuf> {
        let home = self
            .home_dir
            .as_ref()
            .ok_or_else(|| ScaffoldError::Config("no home directory to copy the key from".to_string()))?;
        let bytes = fs::read(home.join(key))?;
        let target = self.project_dir.join(key);
        write_atomic_with_mode(&target, &bytes, PersistMode::OwnerOnly)?;
        tracing::info!(key, to = %target.display(), "copied private key into the build context");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn with_keys(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(SSH_DIR)).unwrap();
        for name in names {
            fs::write(dir.path().join(SSH_DIR).join(name), "key").unwrap();
        }
        dir
    }

    #[test]
    fn test_private_keys_skip_public_and_config() {
        let dir = with_keys(&["id_rsa", "id_rsa.pub", "known_hosts", "config", "deploy"]);
        assert_eq!(private_keys(&dir.path().join(SSH_DIR)), vec!["deploy", "id_rsa"]);
    }

    #[test]
    fn test_project_keys_take_precedence() {
        let project = with_keys(&["deploy"]);
        let home = with_keys(&["id_ed25519"]);
        let catalog = KeyCatalog::discover(project.path(), Some(home.path().join(SSH_DIR)));
        assert_eq!(catalog.offered(), ["deploy"]);
        assert_eq!(catalog.locate("id_ed25519"), Some(KeySource::Home));
    }

    #[test]
    fn test_home_keys_offered_and_copied() {
        let project = TempDir::new().unwrap();
        let home = with_keys(&["id_ed25519", "id_ed25519.pub"]);
        let catalog = KeyCatalog::discover(project.path(), Some(home.path().join(SSH_DIR)));
        assert_eq!(catalog.offered(), ["id_ed25519"]);

        let copied = catalog.copy_into_project("id_ed25519").unwrap();
        assert_eq!(copied, project.path().join(".ssh/id_ed25519"));
        assert_eq!(fs::read_to_string(copied).unwrap(), "key");
    }

    #[test]
    fn test_missing_key_is_validation_error() {
        let project = TempDir::new().unwrap();
        let catalog = KeyCatalog::discover(project.path(), None);
        assert!(catalog.offered().is_empty());
        assert!(matches!(catalog.require("id_rsa"), Err(ScaffoldError::Validation { .. })));
    }
}
