//! Tracing subscriber setup.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Create a non-blocking writer appending to `path`.
///
/// The returned guard must be kept alive for as long as logs should be
/// flushed to the file.
pub fn create_log_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    let log_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    Ok(tracing_appender::non_blocking(file_appender))
}

/// Install the global subscriber: stderr always, plus `log_file` when given.
///
/// `RUST_LOG` wins over `verbose`. Initialization happens at most once.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }))
    };

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match log_file {
        Some(path) => {
            let (writer, guard) = create_log_writer(path)?;
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter())
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .ok();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter())
                .with(stderr_layer)
                .try_init()
                .ok();
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_log_writer_creates_parent_dirs() {
        let tmp = tempfile::tempdir().expect("Failed to create tempdir");
        let path = tmp.path().join("var").join("log").join("pweb.log");

        let (writer, _guard) = create_log_writer(&path).expect("Should create log writer");
        drop(writer);

        assert!(path.parent().unwrap().is_dir(), "log directory should exist");
        assert!(path.exists(), "log file should be created eagerly");
    }

    #[test]
    fn test_create_log_writer_rejects_path_without_file_name() {
        let result = create_log_writer(Path::new("/"));
        assert!(result.is_err(), "root has no file name");
    }

    #[test]
    fn test_create_log_writer_error_on_invalid_dir() {
        let result = create_log_writer(Path::new("/dev/null/impossible/pweb.log"));
        assert!(result.is_err(), "Should fail with invalid directory path");
    }
}
