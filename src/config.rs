//! Project layout and fixed container paths
//!
//! Every file Rocketdoo reads or writes lives under a single project
//! directory. `ProjectPaths` resolves those locations; the constants describe
//! where things end up inside the Odoo image.

use std::path::{Path, PathBuf};

/// Persisted answer model
pub const ANSWERS_FILE: &str = "rocketdoo.yml";

/// Declarative dependency manifest (gitman-compatible)
pub const MANIFEST_FILE: &str = "gitman.yml";

/// Application config artifact holding the addons path line
pub const ODOO_CONF_FILE: &str = "config/odoo.conf";

pub const COMPOSE_FILE: &str = "docker-compose.yaml";
pub const DOCKERFILE: &str = "Dockerfile";

/// Requirement list looked up inside each fetched dependency
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Odoo installation root inside the image
pub const ODOO_ROOT: &str = "/usr/lib/python3/dist-packages/odoo";

/// Manifest `location`: directory (relative to the Odoo root) holding fetched dependencies
pub const EXTERNAL_ADDONS_DIR: &str = "external_addons";

/// Directories created by `scaffold`
pub const SKELETON_DIRS: &[&str] = &["config", "addons", ".vscode"];

/// Build stage compiling the installer that runs inside the image
pub const INSTALLER_BUILDER_IMAGE: &str = "rust:1-slim-bullseye";

/// Installer version pinned in generated Dockerfiles
pub const INSTALLER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the log filter
pub const LOG_ENV: &str = "ROCKETDOO_LOG";

/// Resolved file locations for one project directory
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn answers(&self) -> PathBuf {
        self.root.join(ANSWERS_FILE)
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn odoo_conf(&self) -> PathBuf {
        self.root.join(ODOO_CONF_FILE)
    }

    pub fn compose_file(&self) -> PathBuf {
        self.root.join(COMPOSE_FILE)
    }

    pub fn dockerfile(&self) -> PathBuf {
        self.root.join(DOCKERFILE)
    }

    /// Default project name: the directory's own name
    pub fn dir_name(&self) -> Option<String> {
        let canonical = self.root.canonicalize().ok()?;
        canonical
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
    }
}

/// Container path of a built-in or external addons directory
pub fn container_path(relative: &str) -> String {
    format!("{}/{}", ODOO_ROOT, relative.trim_matches('/'))
}
