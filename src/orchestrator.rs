//! Project scaffolding
//!
//! `init` sequences the whole flow: collect answers, render in memory,
//! commit the artifacts, persist the answers and optionally seed the
//! dependency manifest. Nothing touches the project directory until the
//! answers are final and every template rendered.

use std::fs;
use std::path::PathBuf;

use crate::answers::{
    default_questions, parse_raw_answers, ssh_key_question, AnswerModel, Prompter, Question, Wizard,
};
use crate::config::{ProjectPaths, SKELETON_DIRS};
use crate::error::{Result, ScaffoldError};
use crate::interrupt::CriticalSection;
use crate::manifest::{repo_name_from_url, AddonsLayout, Manifest, ManifestApplier};
use crate::ports::PortRegistry;
use crate::ssh::{KeyCatalog, KeySource, SSH_DIR};
use crate::template::{builtin_templates, render, RenderContext, RenderedSet, TemplateSet};

#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Take answers from this YAML file instead of prompting
    pub answers_file: Option<PathBuf>,
}

#[derive(Debug)]
pub struct InitReport {
    pub answers: AnswerModel,
    pub files: Vec<String>,
    pub dependencies_added: usize,
    /// Things the user must still do before the environment builds
    pub warnings: Vec<String>,
}

/// Enterprise addons are mounted from here when edition `ee` is chosen
pub const ENTERPRISE_DIR: &str = "enterprise";

pub struct Orchestrator {
    paths: ProjectPaths,
    templates: TemplateSet,
    registry: Option<PortRegistry>,
    ssh_home: Option<PathBuf>,
}

impl Orchestrator {
    pub fn new(paths: ProjectPaths) -> Self {
        Self {
            paths,
            templates: builtin_templates(),
            registry: None,
            ssh_home: KeyCatalog::user_ssh_dir(),
        }
    }

    pub fn with_templates(mut self, templates: TemplateSet) -> Self {
        self.templates = templates;
        self
    }

    /// Use this registry instead of probing the host
    pub fn with_registry(mut self, registry: PortRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Look for SSH keys here instead of the user's `~/.ssh`
    pub fn with_ssh_home(mut self, dir: Option<PathBuf>) -> Self {
        self.ssh_home = dir;
        self
    }

    /// Create the project skeleton. Existing files are left alone.
    pub fn scaffold(&self) -> Result<()> {
        let root = self.paths.root();
        for dir in SKELETON_DIRS {
            fs::create_dir_all(root.join(dir))?;
        }

        let manifest_path = self.paths.manifest();
        if !manifest_path.exists() {
            Manifest::default().save(&manifest_path)?;
            tracing::info!(path = %manifest_path.display(), "created empty manifest");
        }
        Ok(())
    }

    pub fn init(&mut self, prompter: &mut dyn Prompter, options: &InitOptions) -> Result<InitReport> {
        let keys = KeyCatalog::discover(self.paths.root(), self.ssh_home.clone());
        let answers = self.collect_answers(prompter, options, &keys)?;
        let key_to_copy = self.ssh_key_to_copy(&answers, &keys, prompter, options)?;
        let rendered = self.render(&answers)?;

        let section = CriticalSection::enter();
        self.scaffold()?;
        if let Some(key) = &key_to_copy {
            keys.copy_into_project(key)?;
        }
        rendered.write_to(self.paths.root())?;
        answers.save(&self.paths.answers())?;
        section.finish()?;

        let warnings = self.warnings(&answers);

        let dependencies_added = if answers.flag("use_external_deps") && options.answers_file.is_none() {
            self.seed_dependencies(&answers, prompter)?
        } else {
            0
        };

        Ok(InitReport {
            files: rendered.paths().map(str::to_string).collect(),
            answers,
            dependencies_added,
            warnings,
        })
    }

    /// Regenerate every artifact from the persisted answers and the current manifest
    pub fn rerender(&self) -> Result<RenderedSet> {
        let answers = AnswerModel::load(&self.paths.answers(), &default_questions())?;
        let rendered = self.render(&answers)?;
        rendered.write_to(self.paths.root())?;
        Ok(rendered)
    }

    fn collect_answers(
        &mut self,
        prompter: &mut dyn Prompter,
        options: &InitOptions,
        keys: &KeyCatalog,
    ) -> Result<AnswerModel> {
        let registry = self
            .registry
            .take()
            .unwrap_or_else(|| PortRegistry::for_project(self.paths.root()));
        let mut wizard = Wizard::new(questions_for(keys), registry);
        if let Some(name) = self.paths.dir_name().and_then(|n| project_name_from_dir(&n)) {
            wizard = wizard.with_default("project_name", name);
        }
        if let Some(first) = keys.offered().first() {
            wizard = wizard.with_default("ssh_key", first.clone());
        }

        match &options.answers_file {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    ScaffoldError::Config(format!("cannot read answers file {}: {}", path.display(), e))
                })?;
                wizard.apply_answers(&parse_raw_answers(&text)?)?;
                wizard.finalize()
            }
            None => wizard.run(prompter),
        }
    }

    /// The chosen key must be in `./.ssh`. A key found only in `~/.ssh` is
    /// copied during the commit; interactively the user confirms first.
    fn ssh_key_to_copy(
        &self,
        answers: &AnswerModel,
        keys: &KeyCatalog,
        prompter: &mut dyn Prompter,
        options: &InitOptions,
    ) -> Result<Option<String>> {
        let key = match answers.text("ssh_key") {
            Some(key) if answers.flag("use_private_repos") => key,
            _ => return Ok(None),
        };
        match keys.require(key)? {
            KeySource::Project => Ok(None),
            KeySource::Home if options.answers_file.is_some() => Ok(Some(key.to_string())),
            KeySource::Home => {
                let label = format!("Copy ~/{}/{} into ./{}?", SSH_DIR, key, SSH_DIR);
                if prompter.confirm(&label, true)? {
                    Ok(Some(key.to_string()))
                } else {
                    Err(ScaffoldError::validation(
                        "ssh_key",
                        format!("place '{}' in ./{} and run init again", key, SSH_DIR),
                    ))
                }
            }
        }
    }

    fn warnings(&self, answers: &AnswerModel) -> Vec<String> {
        let mut warnings = Vec::new();
        if answers.text("edition") == Some("ee") && !self.paths.root().join(ENTERPRISE_DIR).is_dir() {
            warnings.push(format!(
                "No '{}/' folder found. Add the Odoo Enterprise addons there \
                 (e.g. git clone https://github.com/odoo/enterprise.git, subscription required)",
                ENTERPRISE_DIR
            ));
        }
        warnings
    }

    fn render(&self, answers: &AnswerModel) -> Result<RenderedSet> {
        let manifest = Manifest::load(&self.paths.manifest())?;
        let addons_path = AddonsLayout::for_answers(answers).addons_path_value(&manifest);
        render(&self.templates, &RenderContext::from_answers(answers, &addons_path))
    }

    /// Prompt for dependencies until an empty repository is entered.
    /// A rejected entry is reported and the loop goes on.
    fn seed_dependencies(&self, answers: &AnswerModel, prompter: &mut dyn Prompter) -> Result<usize> {
        let applier = ManifestApplier::new(self.paths.clone(), AddonsLayout::for_answers(answers));
        let default_rev = answers.text("odoo_version").map(str::to_string);
        let mut added = 0;

        prompter.notify("\nExternal dependencies (leave the repository empty to finish)");
        loop {
            let repo = match prompter.prompt("Repository URL", None)? {
                Some(r) if !r.trim().is_empty() => r.trim().to_string(),
                _ => break,
            };
            let suggested = repo_name_from_url(&repo);
            let Some(target) = prompter.prompt("Target directory", Some(&suggested))? else {
                break;
            };
            let target = if target.trim().is_empty() { suggested } else { target };
            let Some(rev) = prompter.prompt("Revision (branch, tag or commit)", default_rev.as_deref())?
            else {
                break;
            };
            let rev = match (rev.trim().is_empty(), &default_rev) {
                (true, Some(d)) => d.clone(),
                _ => rev,
            };

            match applier.add_entry(&repo, &rev, Some(&target)) {
                Ok(_) => {
                    prompter.notify(&format!("  Added {} at {}", target.trim(), rev.trim()));
                    added += 1;
                }
                Err(e @ (ScaffoldError::DuplicateTarget(_) | ScaffoldError::InvalidEntry(_))) => {
                    prompter.notify(&format!("  {}", e));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(added)
    }
}

/// The question set with the key question narrowed to the keys found
fn questions_for(keys: &KeyCatalog) -> Vec<Question> {
    default_questions()
        .into_iter()
        .map(|q| if q.key == "ssh_key" { ssh_key_question(keys.offered()) } else { q })
        .collect()
}

/// Best-effort project name from a directory name; `None` if nothing usable is left
pub fn project_name_from_dir(dir: &str) -> Option<String> {
    let name: String = dir
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect();
    let name = name.trim_start_matches(['-', '_']).trim_end_matches('-');
    (!name.is_empty()).then(|| name.to_string())
}

pub fn next_steps(answers: &AnswerModel) -> String {
    let port = answers.integer("odoo_port").unwrap_or(8069);
    format!(
        "Next steps:\n  \
         rocketdoo build     build the development image\n  \
         rocketdoo up -d     start the environment\n\n\
         Odoo will be available at http://localhost:{}",
        port
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::TerminalPrompter;
    use crate::ports::testing::StaticProbe;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn orchestrator(dir: &TempDir, busy: &[u16]) -> Orchestrator {
        Orchestrator::new(ProjectPaths::new(dir.path()))
            .with_registry(PortRegistry::new().with_probe(StaticProbe::busy(busy)))
            .with_ssh_home(None)
    }

    fn answers_file(dir: &TempDir, text: &str) -> InitOptions {
        let path = dir.path().join("answers.yml");
        fs::write(&path, text).unwrap();
        InitOptions {
            answers_file: Some(path),
        }
    }

    fn no_input() -> TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompter::new(Cursor::new(Vec::new()), Vec::new())
    }

    #[test]
    fn test_project_name_from_dir() {
        assert_eq!(project_name_from_dir("My Shop").as_deref(), Some("my-shop"));
        assert_eq!(project_name_from_dir("_odoo17").as_deref(), Some("odoo17"));
        assert_eq!(project_name_from_dir("---"), None);
    }

    #[test]
    fn test_init_from_answers_file() {
        let dir = TempDir::new().unwrap();
        let options = answers_file(&dir, "project_name: acme\nodoo_port: 8069\n");
        let report = orchestrator(&dir, &[8069]).init(&mut no_input(), &options).unwrap();

        assert_eq!(report.answers.integer("odoo_port"), Some(8070));
        for file in ["Dockerfile", "docker-compose.yaml", "config/odoo.conf", "odoo_pg_pass", ".vscode/launch.json"] {
            assert!(dir.path().join(file).is_file(), "missing {}", file);
        }
        assert!(dir.path().join("gitman.yml").is_file());
        assert!(dir.path().join("rocketdoo.yml").is_file());
        assert!(report.warnings.is_empty());
        let compose = fs::read_to_string(dir.path().join("docker-compose.yaml")).unwrap();
        assert!(compose.contains("\"8070:8069\""));
    }

    #[test]
    fn test_incomplete_answers_write_nothing() {
        let dir = TempDir::new().unwrap();
        let options = answers_file(&dir, "project_name: \"Bad Name\"\n");
        let result = orchestrator(&dir, &[]).init(&mut no_input(), &options);
        assert!(matches!(result, Err(ScaffoldError::Validation { .. })));
        assert!(!dir.path().join("Dockerfile").exists());
        assert!(!dir.path().join("rocketdoo.yml").exists());
    }

    #[test]
    fn test_unbound_template_key_writes_nothing() {
        use crate::template::Template;
        use std::borrow::Cow;

        let dir = TempDir::new().unwrap();
        let options = answers_file(&dir, "project_name: acme\n");
        let templates = TemplateSet::new(vec![
            Template {
                path: "Dockerfile".to_string(),
                source: Cow::Borrowed("FROM {{ odoo_image }}\n"),
            },
            Template {
                path: "config/odoo.conf".to_string(),
                source: Cow::Borrowed("[options]\nworkers = {{ worker_count }}\n"),
            },
        ]);

        let result = orchestrator(&dir, &[])
            .with_templates(templates)
            .init(&mut no_input(), &options);
        assert!(matches!(
            result,
            Err(ScaffoldError::TemplateBinding { ref template, ref key })
                if template == "config/odoo.conf" && key == "worker_count"
        ));
        for path in ["Dockerfile", "config", "addons", ".vscode", "gitman.yml", "rocketdoo.yml"] {
            assert!(!dir.path().join(path).exists(), "{} was created", path);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_artifacts_readable_by_container_users() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let options = answers_file(&dir, "project_name: acme\n");
        orchestrator(&dir, &[]).init(&mut no_input(), &options).unwrap();
        for file in ["config/odoo.conf", "odoo_pg_pass", "docker-compose.yaml", "Dockerfile"] {
            let mode = fs::metadata(dir.path().join(file)).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o644, "{}", file);
        }
    }

    #[test]
    fn test_enterprise_without_folder_warns() {
        let dir = TempDir::new().unwrap();
        let options = answers_file(&dir, "project_name: acme\nedition: ee\n");
        let report = orchestrator(&dir, &[]).init(&mut no_input(), &options).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("enterprise/"));

        fs::create_dir(dir.path().join(ENTERPRISE_DIR)).unwrap();
        let options = answers_file(&dir, "project_name: acme\nedition: ee\n");
        let report = orchestrator(&dir, &[]).init(&mut no_input(), &options).unwrap();
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_ssh_key_copied_from_home() {
        let dir = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        fs::write(home.path().join("deploy_key"), "PRIVATE").unwrap();
        fs::write(home.path().join("deploy_key.pub"), "PUBLIC").unwrap();

        let options = answers_file(&dir, "project_name: acme\nuse_private_repos: y\n");
        let report = orchestrator(&dir, &[])
            .with_ssh_home(Some(home.path().to_path_buf()))
            .init(&mut no_input(), &options)
            .unwrap();

        assert_eq!(report.answers.text("ssh_key"), Some("deploy_key"));
        assert_eq!(fs::read_to_string(dir.path().join(".ssh/deploy_key")).unwrap(), "PRIVATE");
        assert!(!dir.path().join(".ssh/deploy_key.pub").exists());
        let dockerfile = fs::read_to_string(dir.path().join("Dockerfile")).unwrap();
        assert!(dockerfile.contains("COPY ./.ssh/deploy_key /root/.ssh/id_rsa"));
    }

    #[test]
    fn test_project_key_offered_as_choice() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".ssh")).unwrap();
        fs::write(dir.path().join(".ssh/id_ed25519"), "PRIVATE").unwrap();

        // Defaults up to the private repository question, then pick key number 1
        let input = "acme\n\n\n\n\n\n\n\n\ny\n1\n\n";
        let mut prompter = TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let report = orchestrator(&dir, &[])
            .init(&mut prompter, &InitOptions::default())
            .unwrap();
        assert_eq!(report.answers.text("ssh_key"), Some("id_ed25519"));
        let output = String::from_utf8(prompter.into_writer()).unwrap();
        assert!(output.contains("(id_ed25519) [id_ed25519]"));
    }

    #[test]
    fn test_missing_ssh_key_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let options = answers_file(&dir, "project_name: acme\nuse_private_repos: y\nssh_key: id_rsa\n");
        let result = orchestrator(&dir, &[]).init(&mut no_input(), &options);
        assert!(matches!(result, Err(ScaffoldError::Validation { ref question, .. }) if question == "ssh_key"));
        assert!(!dir.path().join("Dockerfile").exists());
        assert!(!dir.path().join("rocketdoo.yml").exists());
    }

    #[test]
    fn test_closed_input_aborts_interactive_init() {
        let dir = TempDir::new().unwrap();
        let result = orchestrator(&dir, &[]).init(&mut no_input(), &InitOptions::default());
        assert!(matches!(result, Err(ScaffoldError::IncompleteAnswer(_))));
        assert!(!dir.path().join("config").exists());
    }

    #[test]
    fn test_rerender_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let options = answers_file(&dir, "project_name: acme\n");
        let mut orch = orchestrator(&dir, &[]);
        orch.init(&mut no_input(), &options).unwrap();
        let before = fs::read_to_string(dir.path().join("config/odoo.conf")).unwrap();
        orch.rerender().unwrap();
        let after = fs::read_to_string(dir.path().join("config/odoo.conf")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_seed_loop_reports_duplicate_and_continues() {
        let dir = TempDir::new().unwrap();
        let input = "acme\n\n\n\n\n\n\n\n\n\ny\n\
                     https://github.com/OCA/web.git\n\n17.0\n\
                     https://github.com/other/web.git\nweb\n17.0\n\
                     https://github.com/OCA/server-tools.git\n\n\n\
                     \n";
        let mut prompter = TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let report = orchestrator(&dir, &[])
            .init(&mut prompter, &InitOptions::default())
            .unwrap();

        assert_eq!(report.dependencies_added, 2);
        let output = String::from_utf8(prompter.into_writer()).unwrap();
        assert!(output.contains("already declared"));

        let manifest = Manifest::load(&dir.path().join("gitman.yml")).unwrap();
        let names: Vec<&str> = manifest.sources.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["web", "server_tools"]);
        assert_eq!(manifest.sources[1].rev, "18.0");
        let conf = fs::read_to_string(dir.path().join("config/odoo.conf")).unwrap();
        assert!(conf.contains("external_addons/server_tools"));
    }

    #[test]
    fn test_next_steps_mentions_port() {
        let dir = TempDir::new().unwrap();
        let options = answers_file(&dir, "project_name: acme\nodoo_port: 9000\n");
        let report = orchestrator(&dir, &[]).init(&mut no_input(), &options).unwrap();
        let text = next_steps(&report.answers);
        assert!(text.contains("rocketdoo up -d"));
        assert!(text.contains("localhost:9000"));
    }
}
