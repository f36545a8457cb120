use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Default location of the launcher's system configuration.
pub const SYSTEM_CONF_PATH: &str = "/etc/rnet.conf";
/// Overrides [`SYSTEM_CONF_PATH`] when set.
pub const SYSTEM_CONF_ENV: &str = "PWEB_SYSTEM_CONF";
/// Exported to the launched program: the installation root.
pub const ROOT_ENV: &str = "PROOT";
/// Exported to the launched program: module search directories.
pub const SEARCH_PATH_ENV: &str = "PWEB_PATH";
pub const SITE_CONFIG_FILE: &str = "site.conf";
/// Optional local override layered on top of [`SITE_CONFIG_FILE`].
pub const SITE_OVERRIDE_FILE: &str = "site.local.conf";

fn system_conf_path_from(env_value: Option<OsString>) -> PathBuf {
    env_value
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(SYSTEM_CONF_PATH))
}

/// Resolve the system config path, honoring `PWEB_SYSTEM_CONF`.
pub fn system_conf_path() -> PathBuf {
    system_conf_path_from(std::env::var_os(SYSTEM_CONF_ENV))
}

pub fn web_dir(root: &Path) -> PathBuf {
    root.join("web")
}

pub fn site_config_path(root: &Path) -> PathBuf {
    web_dir(root).join(SITE_CONFIG_FILE)
}

pub fn site_override_path(root: &Path) -> PathBuf {
    web_dir(root).join(SITE_OVERRIDE_FILE)
}

pub fn pid_file_path(root: &Path) -> PathBuf {
    root.join("var").join("rnet.pid")
}

pub fn default_program(root: &Path) -> PathBuf {
    root.join("bin").join("pweb-server")
}

/// Module search directories: `<root>/lib` then `<root>/web`.
pub fn search_path(root: &Path) -> Vec<PathBuf> {
    vec![root.join("lib"), web_dir(root)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_conf_path_default() {
        assert_eq!(system_conf_path_from(None), PathBuf::from("/etc/rnet.conf"));
        assert_eq!(
            system_conf_path_from(Some(OsString::new())),
            PathBuf::from("/etc/rnet.conf")
        );
    }

    #[test]
    fn test_system_conf_path_env_override() {
        assert_eq!(
            system_conf_path_from(Some(OsString::from("/tmp/rnet.conf"))),
            PathBuf::from("/tmp/rnet.conf")
        );
    }

    #[test]
    fn test_layout_under_root() {
        let root = Path::new("/opt/rnet");
        assert_eq!(site_config_path(root), PathBuf::from("/opt/rnet/web/site.conf"));
        assert_eq!(
            site_override_path(root),
            PathBuf::from("/opt/rnet/web/site.local.conf")
        );
        assert_eq!(pid_file_path(root), PathBuf::from("/opt/rnet/var/rnet.pid"));
        assert_eq!(default_program(root), PathBuf::from("/opt/rnet/bin/pweb-server"));
    }
}
