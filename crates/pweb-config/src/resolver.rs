//! Per-request tool resolution.
//!
//! Resolution starts from the global settings, overlays the most specific
//! matching path section, then groups `tools.<namespace>.<property>` keys
//! into a [`ToolPlan`]. It is a pure function of the tree and the path.

use indexmap::IndexMap;
use pweb_core::{ConfigError, Scalar};
use serde::Serialize;
use tracing::trace;

use crate::source::Settings;
use crate::tree::{Section, SectionTree};

const TOOLS_PREFIX: &str = "tools.";
const ENABLE_PROPERTY: &str = "on";

/// Resolved state of one tool namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToolState {
    /// True only when `tools.<ns>.on` is present and boolean `True`.
    pub enabled: bool,
    /// Every property other than `on`, in first-seen order.
    pub properties: IndexMap<String, Scalar>,
}

impl ToolState {
    pub fn property(&self, name: &str) -> Option<&Scalar> {
        self.properties.get(name)
    }
}

/// Resolved behaviors for one request path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolPlan {
    pub path: String,
    /// The path section that matched, if any.
    pub section: Option<String>,
    /// Global settings overlaid with the matched section's settings.
    pub settings: Settings,
    pub tools: IndexMap<String, ToolState>,
}

impl ToolPlan {
    pub fn tool(&self, namespace: &str) -> Option<&ToolState> {
        self.tools.get(namespace)
    }

    pub fn is_enabled(&self, namespace: &str) -> bool {
        self.tool(namespace).is_some_and(|t| t.enabled)
    }

    /// Enabled namespaces in plan order.
    pub fn enabled_tools(&self) -> impl Iterator<Item = &str> {
        self.tools
            .iter()
            .filter(|(_, state)| state.enabled)
            .map(|(name, _)| name.as_str())
    }

    pub fn setting(&self, key: &str) -> Option<&Scalar> {
        self.settings.get(key)
    }
}

/// Resolve the tool plan for `path`.
pub fn resolve(tree: &SectionTree, path: &str) -> Result<ToolPlan, ConfigError> {
    let mut settings = tree.global().settings.clone();

    let matched = match_section(tree, path)?;
    if let Some(section) = matched {
        for (key, value) in &section.settings {
            settings.insert(key.clone(), value.clone());
        }
    }

    let tools = group_tools(&settings);
    trace!(
        path,
        section = matched.map(|s| s.name.as_str()),
        tools = tools.len(),
        "Resolved tool plan"
    );

    Ok(ToolPlan {
        path: path.to_string(),
        section: matched.map(|s| s.name.clone()),
        settings,
        tools,
    })
}

/// Plan for a path no section covers: global settings only.
pub fn resolve_global(tree: &SectionTree) -> ToolPlan {
    let settings = tree.global().settings.clone();
    ToolPlan {
        path: String::new(),
        section: None,
        tools: group_tools(&settings),
        settings,
    }
}

/// Longest path section that covers `path`.
///
/// A section covers a path when the names are equal, or when the name is a
/// prefix of the path and the next path character is `/`.
pub fn match_section<'a>(
    tree: &'a SectionTree,
    path: &str,
) -> Result<Option<&'a Section>, ConfigError> {
    let mut best: Vec<&Section> = Vec::new();

    for section in tree.path_sections() {
        if !covers(&section.name, path) {
            continue;
        }
        match best.first().map(|s| s.name.len()) {
            Some(len) if len > section.name.len() => {}
            Some(len) if len == section.name.len() => best.push(section),
            _ => best = vec![section],
        }
    }

    if best.len() > 1 {
        return Err(ConfigError::AmbiguousRoute {
            path: path.to_string(),
            candidates: best.iter().map(|s| s.name.clone()).collect(),
        });
    }
    Ok(best.into_iter().next())
}

fn covers(name: &str, path: &str) -> bool {
    match path.strip_prefix(name) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Split `tools.<namespace>.<property>`; the namespace may itself contain dots.
pub(crate) fn split_tool_key(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix(TOOLS_PREFIX)?;
    let (namespace, property) = rest.rsplit_once('.')?;
    if namespace.is_empty() || property.is_empty() {
        return None;
    }
    Some((namespace, property))
}

fn group_tools(settings: &Settings) -> IndexMap<String, ToolState> {
    let mut tools: IndexMap<String, ToolState> = IndexMap::new();
    for (key, value) in settings {
        let Some((namespace, property)) = split_tool_key(key) else {
            continue;
        };
        let state = tools.entry(namespace.to_string()).or_default();
        if property == ENABLE_PROPERTY {
            state.enabled = value.as_bool() == Some(true);
        } else {
            state.properties.insert(property.to_string(), value.clone());
        }
    }
    tools
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
