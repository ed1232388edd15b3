//! Values available to templates
//!
//! The context holds every answer verbatim plus names derived from them.
//! Each derived name is computed once here, so a volume or network declared
//! in one template and referenced in another always gets the same token.

use std::collections::BTreeMap;

use crate::answers::AnswerModel;
use crate::config::{
    container_path, INSTALLER_BUILDER_IMAGE, INSTALLER_VERSION, MANIFEST_FILE, ODOO_ROOT,
};

const ENTERPRISE_MOUNT: &str = "./enterprise:/usr/lib/python3/dist-packages/odoo/enterprise";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    values: BTreeMap<String, String>,
}

impl RenderContext {
    /// Answers plus derived names. `addons_path` is supplied separately
    /// because it also depends on the dependency manifest.
    pub fn from_answers(answers: &AnswerModel, addons_path: &str) -> Self {
        let mut ctx = Self::default();
        for (key, value) in answers.iter() {
            ctx.insert(key, value.to_string());
        }

        let project = answers.text("project_name").unwrap_or_default().to_string();
        if let Some(version) = answers.text("odoo_version") {
            ctx.insert("odoo_image", format!("odoo:{}", version));
        }
        ctx.insert("odoo_container", format!("{}-odoo", project));
        ctx.insert("db_container", format!("{}-db", project));
        ctx.insert("web_volume", format!("{}-web-data", project));
        ctx.insert("db_volume", format!("{}-db-data", project));
        ctx.insert("network", format!("{}-net", project));

        let enterprise = answers.text("edition") == Some("ee");
        ctx.insert(
            "enterprise_volume",
            if enterprise {
                format!("- {}", ENTERPRISE_MOUNT)
            } else {
                format!("#- {}", ENTERPRISE_MOUNT)
            },
        );

        ctx.insert("ssh_setup", ssh_setup(answers));
        ctx.insert("odoo_root", ODOO_ROOT);
        ctx.insert("manifest_file", MANIFEST_FILE);
        ctx.insert("installer_builder_image", INSTALLER_BUILDER_IMAGE);
        ctx.insert("rocketdoo_version", INSTALLER_VERSION);
        ctx.insert("addons_path", addons_path);
        ctx
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn ssh_setup(answers: &AnswerModel) -> String {
    match answers.text("ssh_key") {
        Some(key) if answers.flag("use_private_repos") => format!(
            "RUN mkdir -p /root/.ssh\n\
             COPY ./.ssh/{key} /root/.ssh/id_rsa\n\
             RUN chmod 600 /root/.ssh/id_rsa \\\n    \
             && echo \"StrictHostKeyChecking no\" >> /root/.ssh/config",
        ),
        _ => "# Private repositories disabled (no SSH key copied)".to_string(),
    }
}

/// Container path of the enterprise addons, when that edition is selected
pub fn enterprise_path(answers: &AnswerModel) -> Option<String> {
    (answers.text("edition") == Some("ee")).then(|| container_path("enterprise"))
}
