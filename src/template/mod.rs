//! Template rendering
//!
//! Templates are plain text with `{{ key }}` placeholders. There are no
//! conditionals or loops; anything that varies in shape (the enterprise
//! volume, the SSH block) is a derived value in the render context.

mod builtin;
mod context;
mod renderer;

pub use builtin::builtin_templates;
pub use context::{enterprise_path, RenderContext};
pub use renderer::{placeholders, render, RenderedSet};

use std::borrow::Cow;
use std::collections::BTreeMap;

/// One parameterized file, named by its output path relative to the project root
#[derive(Debug, Clone)]
pub struct Template {
    pub path: String,
    pub source: Cow<'static, str>,
}

/// Templates ordered lexically by output path
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: BTreeMap<String, Template>,
}

impl TemplateSet {
    pub fn new(templates: Vec<Template>) -> Self {
        Self {
            templates: templates.into_iter().map(|t| (t.path.clone(), t)).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
