//! Bootstrap and hand-off to the server program.
//!
//! The launcher exports the installation root and module search path,
//! verifies every required module is present on that path, then replaces
//! the current process with the configured program. The full command line
//! (`start` and any flags included) is forwarded unchanged, since the server
//! program dispatches on its own first argument.

use anyhow::{Context, Result};
use pweb_config::{SystemConfig, paths};
use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Exit status when a required module is missing.
pub(crate) const EXIT_MISSING_MODULE: i32 = 1;

/// Everything needed to exec the server program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Launch {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub env: Vec<(String, OsString)>,
    pub cwd: PathBuf,
}

/// Outcome of the bootstrap checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Prepared {
    Ready(Launch),
    MissingModule(String),
}

/// A module is present when some search directory holds an entry whose
/// file stem equals its name (`markov.py`, `cement/`, `rnet_rsa.so`).
pub(crate) fn module_present(search_path: &[PathBuf], name: &str) -> bool {
    search_path.iter().any(|dir| dir_contains_module(dir, name))
}

fn dir_contains_module(dir: &Path, name: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries
        .flatten()
        .any(|entry| entry.path().file_stem().is_some_and(|stem| stem == name))
}

/// First required module not found on the search path.
pub(crate) fn find_missing_module(search_path: &[PathBuf], modules: &[String]) -> Option<String> {
    modules
        .iter()
        .find(|name| !module_present(search_path, name))
        .cloned()
}

/// Arguments handed to the server program: everything after argv[0].
pub(crate) fn forwarded_args(argv: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    argv.into_iter().skip(1).collect()
}

/// Verify modules and build the launch description.
pub(crate) fn prepare(system: &SystemConfig, args: Vec<OsString>) -> Result<Prepared> {
    let search_path = system.search_path();
    if let Some(missing) = find_missing_module(&search_path, &system.modules) {
        return Ok(Prepared::MissingModule(missing));
    }

    let joined = std::env::join_paths(&search_path).context("Invalid module search path")?;
    let env = vec![
        (
            paths::ROOT_ENV.to_string(),
            system.root_path.clone().into_os_string(),
        ),
        (paths::SEARCH_PATH_ENV.to_string(), joined),
    ];

    Ok(Prepared::Ready(Launch {
        program: system.program.clone(),
        args,
        env,
        cwd: paths::web_dir(&system.root_path),
    }))
}

/// Replace this process with the server program. Returns only on failure.
pub(crate) fn exec(launch: Launch) -> anyhow::Error {
    info!(program = %launch.program.display(), args = ?launch.args, "Handing off to server");
    let err = Command::new(&launch.program)
        .args(&launch.args)
        .envs(launch.env.iter().map(|(k, v)| (k, v)))
        .current_dir(&launch.cwd)
        .exec();
    anyhow::Error::new(err).context(format!(
        "Failed to exec server program {}",
        launch.program.display()
    ))
}

/// `pweb start`: bootstrap then exec. Returns an exit code on failure paths.
pub(crate) fn handle_start(system: &SystemConfig, args: Vec<OsString>) -> Result<i32> {
    debug!(root = %system.root_path.display(), modules = ?system.modules, "Bootstrapping");
    match prepare(system, args)? {
        Prepared::Ready(launch) => {
            eprintln!("Starting rnet server");
            Err(exec(launch))
        }
        Prepared::MissingModule(missing) => {
            eprintln!(
                "error: required module '{missing}' not found in {}",
                display_search_path(&system.search_path())
            );
            Ok(EXIT_MISSING_MODULE)
        }
    }
}

pub(crate) fn display_search_path(search_path: &[PathBuf]) -> String {
    search_path
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(":")
}
