//! The `addons_path` option of the runtime configuration
//!
//! The value is never patched incrementally. It is recomputed from the
//! fixed built-in paths and the current manifest, then the single
//! `addons_path` line in `odoo.conf` is replaced wholesale.

use crate::answers::AnswerModel;
use crate::config::container_path;
use crate::template::enterprise_path;

use super::entry::Manifest;

const OPTIONS_HEADER: &str = "[options]";
const ADDONS_KEY: &str = "addons_path";

/// Search paths that exist regardless of the manifest, in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonsLayout {
    builtin: Vec<String>,
}

impl AddonsLayout {
    pub fn new(builtin: Vec<String>) -> Self {
        Self { builtin }
    }

    pub fn for_answers(answers: &AnswerModel) -> Self {
        let mut builtin = Vec::new();
        if let Some(enterprise) = enterprise_path(answers) {
            builtin.push(enterprise);
        }
        builtin.push(container_path("addons"));
        builtin.push(container_path("extra-addons"));
        Self { builtin }
    }

    /// Full search path: built-ins first, then one entry per manifest target
    pub fn paths(&self, manifest: &Manifest) -> Vec<String> {
        let mut paths: Vec<String> = Vec::with_capacity(self.builtin.len() + manifest.len());
        let dependencies = manifest
            .sources
            .iter()
            .map(|e| container_path(&format!("{}/{}", manifest.location, e.name)));
        for path in self.builtin.iter().cloned().chain(dependencies) {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    pub fn addons_path_value(&self, manifest: &Manifest) -> String {
        self.paths(manifest).join(",")
    }
}

fn is_addons_line(line: &str) -> bool {
    line.trim_start()
        .strip_prefix(ADDONS_KEY)
        .map(|rest| rest.trim_start().starts_with('='))
        .unwrap_or(false)
}

/// Replace the `addons_path` line with `value`.
///
/// A missing line is inserted right under `[options]` (the header is added
/// when absent too). Any extra `addons_path` lines are dropped so the file
/// ends up with exactly one.
pub fn rewrite_addons_path(conf: &str, value: &str) -> String {
    let line = format!("{} = {}", ADDONS_KEY, value);
    let mut out: Vec<String> = Vec::new();
    let mut written = false;

    for current in conf.lines() {
        if is_addons_line(current) {
            if !written {
                out.push(line.clone());
                written = true;
            }
            continue;
        }
        out.push(current.to_string());
    }

    if !written {
        match out.iter().position(|l| l.trim() == OPTIONS_HEADER) {
            Some(i) => out.insert(i + 1, line),
            None => {
                out.insert(0, line);
                out.insert(0, OPTIONS_HEADER.to_string());
            }
        }
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}

/// Paths currently listed in the configuration, if the option is present
pub fn read_addons_path(conf: &str) -> Option<Vec<String>> {
    conf.lines().find(|l| is_addons_line(l)).map(|line| {
        let value = line.split_once('=').map(|(_, v)| v).unwrap_or_default();
        value
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    })
}
