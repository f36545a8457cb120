//! Launcher configuration from the system-level file (`/etc/rnet.conf`).
//!
//! The file is a flat list of `key = value` lines:
//!
//! ```text
//! root_path = /opt/rnet
//! program = /opt/rnet/bin/pweb-server
//! modules = rnet_crypto, rnet_rsa, markov
//! ```
//!
//! Only `root_path` is required.

use pweb_core::{ConfigError, Scalar};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::paths;
use crate::source::{is_blank_or_comment, parse_value, split_assignment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemConfig {
    pub root_path: PathBuf,
    /// Program the launcher hands control to.
    pub program: PathBuf,
    /// Module names that must be present on the search path.
    pub modules: Vec<String>,
}

impl SystemConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse system file text; `path` is used for diagnostics only.
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        let mut root_path = None;
        let mut program = None;
        let mut modules = Vec::new();

        for (idx, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if is_blank_or_comment(line) {
                continue;
            }
            let (key, raw_value) = split_assignment(line)
                .map_err(|message| ConfigError::parse(&origin, idx + 1, message))?
                .ok_or_else(|| ConfigError::parse(&origin, idx + 1, "expected 'key = value'"))?;
            let value = scalar_text(parse_value(raw_value));

            match key {
                "root_path" => root_path = Some(value).filter(|v| !v.is_empty()),
                "program" => program = Some(value).filter(|v| !v.is_empty()),
                "modules" => {
                    modules = value
                        .split(',')
                        .map(str::trim)
                        .filter(|m| !m.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                other => warn!(key = other, file = %origin, "Ignoring unknown system config key"),
            }
        }

        let root_path = root_path
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingRoot(path.to_path_buf()))?;
        let program = program
            .map(PathBuf::from)
            .unwrap_or_else(|| paths::default_program(&root_path));

        Ok(Self {
            root_path,
            program,
            modules,
        })
    }

    /// Launcher configuration for a bare root with no system file.
    pub fn for_root(root: &Path) -> Self {
        Self {
            root_path: root.to_path_buf(),
            program: paths::default_program(root),
            modules: Vec::new(),
        }
    }

    /// Replace the root path. A program left at its default follows the new root.
    pub fn with_root(mut self, root: &Path) -> Self {
        if self.program == paths::default_program(&self.root_path) {
            self.program = paths::default_program(root);
        }
        self.root_path = root.to_path_buf();
        self
    }

    /// Directories searched for required modules, in order.
    pub fn search_path(&self) -> Vec<PathBuf> {
        paths::search_path(&self.root_path)
    }
}

fn scalar_text(value: Scalar) -> String {
    match value {
        Scalar::Str(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<SystemConfig, ConfigError> {
        SystemConfig::parse(Path::new("/etc/rnet.conf"), text)
    }

    #[test]
    fn test_root_only_uses_default_program() {
        let cfg = parse("root_path = /opt/rnet\n").unwrap();
        assert_eq!(cfg.root_path, PathBuf::from("/opt/rnet"));
        assert_eq!(cfg.program, PathBuf::from("/opt/rnet/bin/pweb-server"));
        assert!(cfg.modules.is_empty());
    }

    #[test]
    fn test_full_file() {
        let cfg = parse(
            "# launcher\nroot_path = \"/srv/rnet\"\nprogram = /usr/local/bin/rnetd\nmodules = rnet_crypto, rnet_rsa,,markov\n",
        )
        .unwrap();
        assert_eq!(cfg.root_path, PathBuf::from("/srv/rnet"));
        assert_eq!(cfg.program, PathBuf::from("/usr/local/bin/rnetd"));
        assert_eq!(cfg.modules, vec!["rnet_crypto", "rnet_rsa", "markov"]);
    }

    #[test]
    fn test_search_path_derived_from_root() {
        let cfg = parse("root_path = /opt/rnet\n").unwrap();
        assert_eq!(
            cfg.search_path(),
            vec![PathBuf::from("/opt/rnet/lib"), PathBuf::from("/opt/rnet/web")]
        );
    }

    #[test]
    fn test_missing_root_is_error() {
        let err = parse("modules = a\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingRoot(_)), "unexpected error: {err}");
        let err = parse("root_path =\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingRoot(_)), "unexpected error: {err}");
    }

    #[test]
    fn test_garbage_line_is_parse_error() {
        let err = parse("root_path = /opt/rnet\nnonsense\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }), "unexpected error: {err}");
    }

    #[test]
    fn test_with_root_moves_default_program_only() {
        let moved = parse("root_path = /opt/rnet\n")
            .unwrap()
            .with_root(Path::new("/srv/rnet"));
        assert_eq!(moved.program, PathBuf::from("/srv/rnet/bin/pweb-server"));

        let pinned = parse("root_path = /opt/rnet\nprogram = /usr/bin/rnetd\n")
            .unwrap()
            .with_root(Path::new("/srv/rnet"));
        assert_eq!(pinned.root_path, PathBuf::from("/srv/rnet"));
        assert_eq!(pinned.program, PathBuf::from("/usr/bin/rnetd"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rnet.conf");
        std::fs::write(&path, "root_path = /opt/rnet\n").unwrap();
        let cfg = SystemConfig::load(&path).unwrap();
        assert_eq!(cfg.root_path, PathBuf::from("/opt/rnet"));
    }
}
