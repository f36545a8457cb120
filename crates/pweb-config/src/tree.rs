//! Section tree: the global section plus flat path-prefix sections.
//!
//! Built once from a base document and an optional override document, then
//! read-only. A configuration change means building a new tree and swapping
//! it in whole (see [`crate::handle::TreeHandle`]).

use indexmap::IndexMap;
use pweb_core::{ConfigError, Scalar};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::resolver::{self, ToolPlan};
use crate::source::{Document, GLOBAL_SECTION, Settings};

/// A named group of settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub name: String,
    pub settings: Settings,
}

impl Section {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            settings: Settings::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.settings.get(key)
    }

    pub fn is_global(&self) -> bool {
        self.name == GLOBAL_SECTION
    }

    /// Merge `overlay` key-by-key: overlay values win, base-only keys persist.
    fn merge(&mut self, overlay: Settings) {
        for (key, value) in overlay {
            self.settings.insert(key, value);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionTree {
    global: Section,
    /// Non-global sections in declaration order (base first, then
    /// override-only sections).
    paths: IndexMap<String, Section>,
}

impl SectionTree {
    /// Build from a base document and an optional override layer.
    pub fn build(base: Document, overlay: Option<Document>) -> Self {
        Self::from_documents(std::iter::once(base).chain(overlay))
    }

    /// Build from documents applied in order; later documents override earlier ones.
    pub fn from_documents(docs: impl IntoIterator<Item = Document>) -> Self {
        let mut global = Section::empty(GLOBAL_SECTION);
        let mut paths: IndexMap<String, Section> = IndexMap::new();

        for doc in docs {
            debug!(origin = %doc.origin, "Merging config document");
            for (name, settings) in doc.sections {
                if name == GLOBAL_SECTION {
                    global.merge(settings);
                } else {
                    paths
                        .entry(name.clone())
                        .or_insert_with(|| Section::empty(&name))
                        .merge(settings);
                }
            }
        }

        Self { global, paths }
    }

    /// Load the base document from disk, plus the override document when given.
    pub fn load(base_path: &Path, override_path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = Document::from_path(base_path)?;
        let overlay = override_path.map(Document::from_path).transpose()?;
        let tree = Self::build(base, overlay);
        info!(
            base = %base_path.display(),
            overlay = ?override_path.map(|p| p.display().to_string()),
            sections = tree.paths.len(),
            "Loaded site configuration"
        );
        Ok(tree)
    }

    /// Look up a section by name; `global` always resolves.
    pub fn section(&self, name: &str) -> Option<&Section> {
        if name == GLOBAL_SECTION {
            Some(&self.global)
        } else {
            self.paths.get(name)
        }
    }

    pub fn global(&self) -> &Section {
        &self.global
    }

    /// Non-global sections in declaration order.
    pub fn path_sections(&self) -> impl Iterator<Item = &Section> {
        self.paths.values()
    }

    /// Resolve the tool plan for one request path.
    pub fn resolve(&self, path: &str) -> Result<ToolPlan, ConfigError> {
        resolver::resolve(self, path)
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
