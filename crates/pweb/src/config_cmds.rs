use anyhow::{Context, Result};
use pweb_config::validate::has_errors;
use pweb_config::{Finding, SectionTree, ServerSettings, Severity, ToolPlan, validate_config};
use pweb_core::OutputFormat;
use std::fmt::Write as _;

use crate::site::SiteFiles;

pub(crate) fn handle_resolve(tree: &SectionTree, path: &str, format: OutputFormat) -> Result<()> {
    let plan = tree.resolve(path)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Text => print!("{}", format_plan(&plan)),
    }
    Ok(())
}

pub(crate) fn handle_sections(tree: &SectionTree, format: OutputFormat) -> Result<()> {
    let sections: Vec<_> = std::iter::once(tree.global())
        .chain(tree.path_sections())
        .collect();
    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = sections
                .iter()
                .map(|s| serde_json::json!({ "name": s.name, "keys": s.settings.len() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            for section in sections {
                println!("[{}] ({} keys)", section.name, section.settings.len());
            }
        }
    }
    Ok(())
}

/// Returns the process exit code: 1 when any finding is an error.
pub(crate) fn handle_check(files: &SiteFiles, format: OutputFormat) -> Result<i32> {
    let findings = validate_config(&files.config, files.overlay.as_deref()).with_context(|| {
        format!(
            "Failed to load site configuration {}",
            files.config.display()
        )
    })?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&findings)?),
        OutputFormat::Text => {
            if findings.is_empty() {
                println!("Configuration OK");
            }
            for finding in &findings {
                println!("{}", format_finding(finding));
            }
        }
    }
    Ok(if has_errors(&findings) { 1 } else { 0 })
}

pub(crate) fn handle_show(tree: &SectionTree, format: OutputFormat) -> Result<()> {
    let settings = ServerSettings::from_tree(tree)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&settings)?),
        OutputFormat::Text => print!("{}", format_settings(&settings)),
    }
    Ok(())
}

fn format_finding(finding: &Finding) -> String {
    let label = match finding.severity {
        Severity::Warning => "warning",
        Severity::Error => "error",
    };
    format!("{label}: [{}] {}", finding.section, finding.message)
}

pub(crate) fn format_plan(plan: &ToolPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "path:    {}", plan.path);
    let _ = writeln!(
        out,
        "section: {}",
        plan.section.as_deref().unwrap_or("(global only)")
    );

    let _ = writeln!(out, "tools:");
    if plan.tools.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (name, state) in &plan.tools {
        let flag = if state.enabled { "on" } else { "off" };
        let props: Vec<String> = state
            .properties
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        let _ = writeln!(out, "  {name:<12} {flag:<3} {}", props.join(" ").trim_end());
    }

    let _ = writeln!(out, "settings:");
    for (key, value) in &plan.settings {
        let _ = writeln!(out, "  {key} = {value}");
    }
    out
}

fn format_settings(settings: &ServerSettings) -> String {
    let opt = |p: &Option<std::path::PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    let mut out = String::new();
    let _ = writeln!(out, "bind:        {}", settings.bind_address());
    let _ = writeln!(out, "threads:     {}", settings.thread_pool);
    let _ = writeln!(out, "sessions:    {}", settings.sessions);
    let _ = writeln!(
        out,
        "encode:      {} ({})",
        settings.encode, settings.encoding
    );
    let _ = writeln!(out, "access log:  {}", opt(&settings.access_log));
    let _ = writeln!(out, "error log:   {}", opt(&settings.error_log));
    let _ = writeln!(out, "static root: {}", opt(&settings.static_root));
    out
}
