//! Installation diagnostics for pweb.

use anyhow::Result;
use pweb_config::validate::has_errors;
use pweb_config::{SystemConfig, paths, validate_tree};
use pweb_core::OutputFormat;
use std::path::PathBuf;

use crate::cli::SiteArgs;
use crate::launcher::module_present;
use crate::site;

#[derive(Debug)]
struct DirStatus {
    path: PathBuf,
    exists: bool,
}

#[derive(Debug)]
struct ModuleStatus {
    name: String,
    present: bool,
}

#[derive(Debug)]
enum SiteStatus {
    Missing(PathBuf),
    Invalid { path: PathBuf, error: String },
    Loaded { path: PathBuf, sections: usize, errors: bool },
}

#[derive(Debug)]
struct Report {
    system: Result<SystemConfig, String>,
    program_exists: bool,
    search_path: Vec<DirStatus>,
    modules: Vec<ModuleStatus>,
    site: Option<SiteStatus>,
}

impl Report {
    fn gather(args: &SiteArgs) -> Self {
        let system = site::load_system(args).map_err(|e| format!("{e:#}"));
        let (program_exists, search_path, modules) = match &system {
            Ok(system) => {
                let search = system.search_path();
                let modules = system
                    .modules
                    .iter()
                    .map(|name| ModuleStatus {
                        name: name.clone(),
                        present: module_present(&search, name),
                    })
                    .collect();
                let dirs = search
                    .into_iter()
                    .map(|path| DirStatus {
                        exists: path.is_dir(),
                        path,
                    })
                    .collect();
                (system.program.is_file(), dirs, modules)
            }
            Err(_) => (false, Vec::new(), Vec::new()),
        };

        let site = site_status(args, system.as_ref().ok());
        Self {
            system,
            program_exists,
            search_path,
            modules,
            site,
        }
    }

    fn healthy(&self) -> bool {
        self.system.is_ok()
            && self.program_exists
            && self.modules.iter().all(|m| m.present)
            && matches!(self.site, Some(SiteStatus::Loaded { errors: false, .. }))
    }
}

fn site_status(args: &SiteArgs, system: Option<&SystemConfig>) -> Option<SiteStatus> {
    let path = match (&args.config, system) {
        (Some(config), _) => config.clone(),
        (None, Some(system)) => paths::site_config_path(&system.root_path),
        (None, None) => return None,
    };
    if !path.is_file() {
        return Some(SiteStatus::Missing(path));
    }
    let located = site::locate(args).and_then(|files| files.load_tree());
    Some(match located {
        Ok(tree) => SiteStatus::Loaded {
            path,
            sections: tree.path_sections().count(),
            errors: has_errors(&validate_tree(&tree)),
        },
        Err(e) => SiteStatus::Invalid {
            path,
            error: format!("{e:#}"),
        },
    })
}

fn mark(ok: bool) -> &'static str {
    if ok { "ok" } else { "MISSING" }
}

/// Run installation diagnostics. Returns the process exit code.
pub(crate) fn run_doctor(args: &SiteArgs, format: OutputFormat) -> Result<i32> {
    let report = Report::gather(args);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(&report))?),
        OutputFormat::Text => print_text(&report),
    }
    Ok(if report.healthy() { 0 } else { 1 })
}

fn print_text(report: &Report) {
    println!("=== pweb Environment Check ===");
    println!("Version:  {}", env!("CARGO_PKG_VERSION"));
    match &report.system {
        Ok(system) => {
            println!("Root:     {}", system.root_path.display());
            println!(
                "Program:  {} [{}]",
                system.program.display(),
                mark(report.program_exists)
            );
        }
        Err(e) => println!("System config: {e}"),
    }
    println!();

    println!("=== Search Path ===");
    for dir in &report.search_path {
        println!("{:<40} [{}]", dir.path.display(), mark(dir.exists));
    }
    println!();

    println!("=== Required Modules ===");
    if report.modules.is_empty() {
        println!("(none configured)");
    }
    for module in &report.modules {
        println!("{:<20} [{}]", module.name, mark(module.present));
    }
    println!();

    println!("=== Site Config ===");
    match &report.site {
        None => println!("(root unknown)"),
        Some(SiteStatus::Missing(path)) => println!("{} [MISSING]", path.display()),
        Some(SiteStatus::Invalid { path, error }) => {
            println!("{} [INVALID]", path.display());
            println!("  {error}");
        }
        Some(SiteStatus::Loaded {
            path,
            sections,
            errors,
        }) => {
            println!("{} [ok]", path.display());
            println!("  {sections} path section(s)");
            if *errors {
                println!("  validation errors present, run `pweb check`");
            }
        }
    }
}

fn to_json(report: &Report) -> serde_json::Value {
    let system = match &report.system {
        Ok(system) => serde_json::json!({
            "root_path": system.root_path,
            "program": system.program,
            "program_exists": report.program_exists,
        }),
        Err(e) => serde_json::json!({ "error": e }),
    };
    let search_path: Vec<serde_json::Value> = report
        .search_path
        .iter()
        .map(|d| serde_json::json!({ "path": d.path, "exists": d.exists }))
        .collect();
    let modules: Vec<serde_json::Value> = report
        .modules
        .iter()
        .map(|m| serde_json::json!({ "name": m.name, "present": m.present }))
        .collect();
    let site = match &report.site {
        None => serde_json::Value::Null,
        Some(SiteStatus::Missing(path)) => serde_json::json!({
            "path": path,
            "found": false,
            "valid": false,
        }),
        Some(SiteStatus::Invalid { path, error }) => serde_json::json!({
            "path": path,
            "found": true,
            "valid": false,
            "error": error,
        }),
        Some(SiteStatus::Loaded {
            path,
            sections,
            errors,
        }) => serde_json::json!({
            "path": path,
            "found": true,
            "valid": !errors,
            "sections": sections,
        }),
    };

    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "healthy": report.healthy(),
        "system": system,
        "search_path": search_path,
        "modules": modules,
        "site": site,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn install(root: &Path, site_conf: &str) {
        std::fs::create_dir_all(root.join("bin")).unwrap();
        std::fs::create_dir_all(root.join("lib")).unwrap();
        std::fs::create_dir_all(root.join("web")).unwrap();
        std::fs::write(root.join("bin").join("pweb-server"), "").unwrap();
        std::fs::write(root.join("lib").join("markov.py"), "").unwrap();
        std::fs::write(root.join("web").join("site.conf"), site_conf).unwrap();
    }

    fn args_for(dir: &Path, system_text: &str) -> SiteArgs {
        let system = dir.join("rnet.conf");
        std::fs::write(&system, system_text).unwrap();
        SiteArgs {
            system_conf: Some(system),
            ..Default::default()
        }
    }

    #[test]
    fn test_healthy_install() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("rnet");
        install(&root, "[global]\n[/images]\ntools.staticdir.on = True\ntools.staticdir.dir = \"images\"\n");
        let args = args_for(
            dir.path(),
            &format!("root_path = {}\nmodules = markov\n", root.display()),
        );

        let report = Report::gather(&args);
        assert!(report.healthy(), "report: {report:?}");
        assert!(report.search_path.iter().all(|d| d.exists));
        assert!(matches!(
            report.site,
            Some(SiteStatus::Loaded { sections: 1, errors: false, .. })
        ));
    }

    #[test]
    fn test_missing_module_is_unhealthy() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("rnet");
        install(&root, "[global]\n");
        let args = args_for(
            dir.path(),
            &format!("root_path = {}\nmodules = markov, rnet_rsa\n", root.display()),
        );

        let report = Report::gather(&args);
        assert!(!report.healthy());
        let missing: Vec<_> = report
            .modules
            .iter()
            .filter(|m| !m.present)
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(missing, vec!["rnet_rsa"]);
    }

    #[test]
    fn test_invalid_site_config_reported() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("rnet");
        install(&root, "[global]\nnot an assignment\n");
        let args = args_for(dir.path(), &format!("root_path = {}\n", root.display()));

        let report = Report::gather(&args);
        assert!(matches!(report.site, Some(SiteStatus::Invalid { .. })));
        assert_eq!(to_json(&report)["site"]["valid"], false);
    }

    #[test]
    fn test_missing_system_config() {
        let dir = tempdir().unwrap();
        let args = SiteArgs {
            system_conf: Some(dir.path().join("missing.conf")),
            ..Default::default()
        };
        let report = Report::gather(&args);
        assert!(report.system.is_err());
        assert!(report.site.is_none());
        let json = to_json(&report);
        assert_eq!(json["healthy"], false);
        assert!(json["system"]["error"].is_string());
    }
}
