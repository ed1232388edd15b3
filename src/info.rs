//! Summary of a scaffolded project

use std::collections::BTreeMap;
use std::fs;

use serde::Serialize;

use crate::answers::{default_questions, AnswerModel};
use crate::config::ProjectPaths;
use crate::error::Result;
use crate::manifest::{read_addons_path, Manifest};
use crate::template::builtin_templates;

const SECRET_KEYS: &[&str] = &["admin_passwd", "db_password"];
const MASK: &str = "********";

#[derive(Debug, Clone, Serialize)]
pub struct DependencyInfo {
    pub name: String,
    pub repo: String,
    pub rev: String,
    /// Whether a checkout exists under the project directory
    pub present: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub path: String,
    pub present: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectInfo {
    pub project_dir: String,
    pub answers: BTreeMap<String, String>,
    pub dependencies: Vec<DependencyInfo>,
    pub addons_path: Vec<String>,
    pub artifacts: Vec<ArtifactInfo>,
}

impl ProjectInfo {
    pub fn gather(paths: &ProjectPaths) -> Result<Self> {
        let answers = AnswerModel::load(&paths.answers(), &default_questions())?;
        let manifest = Manifest::load(&paths.manifest())?;
        let root = paths.root();

        let answers = answers
            .iter()
            .map(|(k, v)| {
                let shown = if SECRET_KEYS.contains(&k) { MASK.to_string() } else { v.to_string() };
                (k.to_string(), shown)
            })
            .collect();

        let dependencies = manifest
            .sources
            .iter()
            .map(|e| DependencyInfo {
                name: e.name.clone(),
                repo: e.repo.clone(),
                rev: e.rev.clone(),
                present: root.join(&manifest.location).join(&e.name).is_dir(),
            })
            .collect();

        let addons_path = fs::read_to_string(paths.odoo_conf())
            .ok()
            .and_then(|conf| read_addons_path(&conf))
            .unwrap_or_default();

        let artifacts = builtin_templates()
            .iter()
            .map(|t| ArtifactInfo {
                path: t.path.clone(),
                present: root.join(&t.path).is_file(),
            })
            .collect();

        Ok(Self {
            project_dir: root.display().to_string(),
            answers,
            dependencies,
            addons_path,
            artifacts,
        })
    }

    pub fn answer(&self, key: &str) -> Option<&str> {
        self.answers.get(key).map(String::as_str)
    }
}
