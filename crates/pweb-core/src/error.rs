use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{origin}:{line}: {message}")]
    Parse {
        /// Document label (file path or `<inline>`).
        origin: String,
        /// 1-based line number.
        line: usize,
        message: String,
    },

    #[error("Cannot coerce value '{raw}': {reason}")]
    Type { raw: String, reason: String },

    #[error("Ambiguous route for '{path}': sections {candidates:?} match with equal length")]
    AmbiguousRoute {
        path: String,
        candidates: Vec<String>,
    },

    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("root_path is not configured in {0}")]
    MissingRoot(PathBuf),
}

impl ConfigError {
    pub fn parse(origin: &str, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.to_string(),
            line,
            message: message.into(),
        }
    }

    pub fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}
