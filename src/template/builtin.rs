//! The environment templates shipped with Rocketdoo

use std::borrow::Cow;

use super::{Template, TemplateSet};

const BUILTIN: &[(&str, &str)] = &[
    ("Dockerfile", include_str!("../../templates/Dockerfile.tmpl")),
    ("docker-compose.yaml", include_str!("../../templates/docker-compose.yaml.tmpl")),
    ("config/odoo.conf", include_str!("../../templates/config/odoo.conf.tmpl")),
    ("odoo_pg_pass", include_str!("../../templates/odoo_pg_pass.tmpl")),
    (".vscode/launch.json", include_str!("../../templates/vscode/launch.json.tmpl")),
];

pub fn builtin_templates() -> TemplateSet {
    TemplateSet::new(
        BUILTIN
            .iter()
            .map(|(path, source)| Template {
                path: path.to_string(),
                source: Cow::Borrowed(source),
            })
            .collect(),
    )
}
