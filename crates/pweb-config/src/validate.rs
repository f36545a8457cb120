use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

use crate::resolver::{ToolPlan, resolve_global, split_tool_key};
use crate::server::ServerSettings;
use crate::source::GLOBAL_SECTION;
use crate::tree::{Section, SectionTree};

/// Tool namespaces the serving layer understands.
pub const KNOWN_TOOLS: &[&str] = &["staticdir", "staticfile", "sessions", "encode"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub section: String,
    pub message: String,
}

impl Finding {
    fn warning(section: &str, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            section: section.to_string(),
            message,
        }
    }
}

pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(|f| f.severity == Severity::Error)
}

/// Load base (+ optional override) and validate the resulting tree.
/// Load failures are returned as errors, not findings.
pub fn validate_config(base: &Path, override_path: Option<&Path>) -> Result<Vec<Finding>> {
    let tree = SectionTree::load(base, override_path)?;
    Ok(validate_tree(&tree))
}

/// Check a built tree. Errors mean the serving layer cannot start.
pub fn validate_tree(tree: &SectionTree) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Err(e) = ServerSettings::from_tree(tree) {
        findings.push(Finding {
            severity: Severity::Error,
            section: GLOBAL_SECTION.to_string(),
            message: e.to_string(),
        });
    }

    let sections = std::iter::once(tree.global()).chain(tree.path_sections());
    for section in sections {
        check_namespaces(section, &mut findings);
    }

    check_static_tools(GLOBAL_SECTION, &resolve_global(tree), &mut findings);
    for section in tree.path_sections() {
        match tree.resolve(&section.name) {
            Ok(plan) => check_static_tools(&section.name, &plan, &mut findings),
            Err(e) => findings.push(Finding {
                severity: Severity::Error,
                section: section.name.clone(),
                message: e.to_string(),
            }),
        }
    }

    for finding in &findings {
        warn!(
            severity = ?finding.severity,
            section = %finding.section,
            "{}",
            finding.message
        );
    }
    findings
}

fn check_namespaces(section: &Section, findings: &mut Vec<Finding>) {
    let mut seen: Vec<&str> = Vec::new();
    for key in section.settings.keys() {
        let Some((namespace, _)) = split_tool_key(key) else {
            continue;
        };
        if KNOWN_TOOLS.contains(&namespace) || seen.contains(&namespace) {
            continue;
        }
        seen.push(namespace);
        findings.push(Finding::warning(
            &section.name,
            format!("unknown tool namespace '{namespace}'"),
        ));
    }
}

/// Static handlers need their target; checked on the effective plan so
/// values inherited from global count.
fn check_static_tools(section: &str, plan: &ToolPlan, findings: &mut Vec<Finding>) {
    if let Some(staticdir) = plan.tool("staticdir").filter(|t| t.enabled) {
        if staticdir.property("dir").is_none() {
            findings.push(Finding::warning(
                section,
                "tools.staticdir is on but tools.staticdir.dir is not set".to_string(),
            ));
        }
    }

    if let Some(staticfile) = plan.tool("staticfile").filter(|t| t.enabled) {
        match staticfile.property("filename").and_then(|v| v.as_str()) {
            None => findings.push(Finding::warning(
                section,
                "tools.staticfile is on but tools.staticfile.filename is not set".to_string(),
            )),
            Some(name) if !Path::new(name).is_absolute() => findings.push(Finding::warning(
                section,
                format!("tools.staticfile.filename '{name}' is not an absolute path"),
            )),
            Some(_) => {}
        }
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
