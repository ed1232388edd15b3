//! Placeholder substitution
//!
//! `render` is pure: it turns a template set and a context into an in-memory
//! file set or fails as a whole. Nothing touches the disk until
//! `RenderedSet::write_to`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::context::RenderContext;
use super::{Template, TemplateSet};
use crate::error::{Result, ScaffoldError};
use crate::interrupt::CriticalSection;
use crate::persist::write_all_atomic;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{(.*?)\}\}").expect("placeholder pattern is valid"))
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"))
}

/// Keys referenced by a template, in first-appearance order without repeats
pub fn placeholders(source: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    placeholder_re()
        .captures_iter(source)
        .map(|c| c[1].trim().to_string())
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

fn render_one(template: &Template, ctx: &RenderContext) -> Result<String> {
    let source = template.source.as_ref();
    let mut out = String::with_capacity(source.len());
    let mut last = 0;

    for caps in placeholder_re().captures_iter(source) {
        let whole = caps.get(0).expect("group 0 always present");
        let key = caps[1].trim();

        if !identifier_re().is_match(key) {
            return Err(ScaffoldError::TemplateBinding {
                template: template.path.clone(),
                key: key.to_string(),
            });
        }
        let value = ctx.get(key).ok_or_else(|| ScaffoldError::TemplateBinding {
            template: template.path.clone(),
            key: key.to_string(),
        })?;

        out.push_str(&source[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&source[last..]);
    Ok(out)
}

/// Render every template in path order; the first unbound key fails the whole set
pub fn render(set: &TemplateSet, ctx: &RenderContext) -> Result<RenderedSet> {
    let mut files = BTreeMap::new();
    for template in set.iter() {
        let content = render_one(template, ctx)?;
        files.insert(template.path.clone(), content.into_bytes());
    }
    tracing::debug!(files = files.len(), "rendered template set");
    Ok(RenderedSet { files })
}

/// Fully rendered artifacts keyed by path relative to the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSet {
    files: BTreeMap<String, Vec<u8>>,
}

impl RenderedSet {
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Commit every file atomically. A failed write rolls back the files written
    /// before it, and an interrupt is deferred until the set is complete.
    pub fn write_to(&self, root: &Path) -> Result<()> {
        let section = CriticalSection::enter();
        write_all_atomic(
            self.files
                .iter()
                .map(|(path, content)| (root.join(path), content.as_slice())),
        )?;
        tracing::info!(count = self.files.len(), root = %root.display(), "artifacts written");
        section.finish()
    }
}
