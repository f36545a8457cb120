//! Locate the installation root and the site configuration files.

use anyhow::{Context, Result};
use pweb_config::{SectionTree, SystemConfig, paths};
use pweb_core::ConfigError;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::SiteArgs;

/// Resolved site configuration files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SiteFiles {
    pub config: PathBuf,
    pub overlay: Option<PathBuf>,
}

impl SiteFiles {
    pub fn load_tree(&self) -> Result<SectionTree> {
        SectionTree::load(&self.config, self.overlay.as_deref()).with_context(|| {
            format!(
                "Failed to load site configuration {}",
                self.config.display()
            )
        })
    }
}

/// Load the launcher configuration; `--root` replaces its root path and
/// stands in for a missing system file.
pub(crate) fn load_system(args: &SiteArgs) -> Result<SystemConfig> {
    let path = args
        .system_conf
        .clone()
        .unwrap_or_else(paths::system_conf_path);

    match (SystemConfig::load(&path), &args.root) {
        (Ok(config), Some(root)) => Ok(config.with_root(root)),
        (Ok(config), None) => Ok(config),
        (Err(ConfigError::Read { .. }), Some(root)) => {
            debug!(path = %path.display(), "System config unreadable, using --root");
            Ok(SystemConfig::for_root(root))
        }
        (Err(e), _) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}

/// Resolve which site files to load.
///
/// An explicit `--config` needs no root. Without `--override`, the local
/// override next to the site config is used when it exists.
pub(crate) fn locate(args: &SiteArgs) -> Result<SiteFiles> {
    let config = match &args.config {
        Some(config) => config.clone(),
        None => paths::site_config_path(&load_system(args)?.root_path),
    };

    let overlay = match &args.override_path {
        Some(path) => Some(path.clone()),
        None => {
            let candidate = config.with_file_name(paths::SITE_OVERRIDE_FILE);
            candidate.is_file().then_some(candidate)
        }
    };

    debug!(config = %config.display(), overlay = ?overlay, "Located site configuration");
    Ok(SiteFiles { config, overlay })
}
