//! Typed view of the global section consumed by the serving layer.

use pweb_core::{ConfigError, Scalar};
use serde::Serialize;
use std::path::PathBuf;

use crate::tree::{Section, SectionTree};

const DEFAULT_SOCKET_HOST: &str = "127.0.0.1";
const DEFAULT_SOCKET_PORT: u16 = 8080;
const DEFAULT_THREAD_POOL: u32 = 10;
const DEFAULT_ENCODING: &str = "utf-8";

/// Global server parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerSettings {
    pub socket_host: String,
    pub socket_port: u16,
    /// Worker-thread count (`server.thread_pool`, always >= 1).
    pub thread_pool: u32,
    pub sessions: bool,
    pub encode: bool,
    pub encoding: String,
    pub access_log: Option<PathBuf>,
    pub error_log: Option<PathBuf>,
    /// Root that relative `tools.staticdir.dir` values are joined onto.
    pub static_root: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            socket_host: DEFAULT_SOCKET_HOST.to_string(),
            socket_port: DEFAULT_SOCKET_PORT,
            thread_pool: DEFAULT_THREAD_POOL,
            sessions: false,
            encode: false,
            encoding: DEFAULT_ENCODING.to_string(),
            access_log: None,
            error_log: None,
            static_root: None,
        }
    }
}

impl ServerSettings {
    pub fn from_tree(tree: &SectionTree) -> Result<Self, ConfigError> {
        Self::from_section(tree.global())
    }

    pub fn from_section(global: &Section) -> Result<Self, ConfigError> {
        let view = GlobalView(global);
        let defaults = Self::default();

        let socket_port = match view.server_int("socket_port")? {
            Some(port) => u16::try_from(port).map_err(|_| {
                ConfigError::invalid("server.socket_port", format!("{port} is not a valid port"))
            })?,
            None => defaults.socket_port,
        };

        let thread_pool = match view.server_int("thread_pool")? {
            Some(n) if n >= 1 => u32::try_from(n).map_err(|_| {
                ConfigError::invalid("server.thread_pool", format!("{n} is too large"))
            })?,
            Some(n) => {
                return Err(ConfigError::invalid(
                    "server.thread_pool",
                    format!("must be >= 1 (got {n})"),
                ));
            }
            None => defaults.thread_pool,
        };

        Ok(Self {
            socket_host: view
                .server_str("socket_host")?
                .unwrap_or(defaults.socket_host),
            socket_port,
            thread_pool,
            sessions: view.bool("tools.sessions.on")?.unwrap_or(defaults.sessions),
            encode: view.bool("tools.encode.on")?.unwrap_or(defaults.encode),
            encoding: view
                .string("tools.encode.encoding")?
                .unwrap_or(defaults.encoding),
            access_log: view.string("log.access_file")?.map(PathBuf::from),
            error_log: view.string("log.error_file")?.map(PathBuf::from),
            static_root: view.string("tools.staticdir.root")?.map(PathBuf::from),
        })
    }

    /// `host:port` as handed to the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.socket_host, self.socket_port)
    }
}

struct GlobalView<'a>(&'a Section);

impl GlobalView<'_> {
    /// `server.<name>`, falling back to the bare `<name>` key.
    fn lookup_server(&self, name: &str) -> Option<(String, &Scalar)> {
        let dotted = format!("server.{name}");
        if let Some(value) = self.0.get(&dotted) {
            return Some((dotted, value));
        }
        self.0.get(name).map(|value| (name.to_string(), value))
    }

    fn server_int(&self, name: &str) -> Result<Option<i64>, ConfigError> {
        match self.lookup_server(name) {
            Some((key, value)) => expect_int(&key, value).map(Some),
            None => Ok(None),
        }
    }

    fn server_str(&self, name: &str) -> Result<Option<String>, ConfigError> {
        match self.lookup_server(name) {
            Some((key, value)) => expect_str(&key, value).map(Some),
            None => Ok(None),
        }
    }

    fn bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.0
            .get(key)
            .map(|value| {
                value.as_bool().ok_or_else(|| {
                    ConfigError::invalid(key, format!("expected True/False, got {}", value.kind()))
                })
            })
            .transpose()
    }

    fn string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.0.get(key).map(|value| expect_str(key, value)).transpose()
    }
}

fn expect_int(key: &str, value: &Scalar) -> Result<i64, ConfigError> {
    value
        .as_int()
        .ok_or_else(|| ConfigError::invalid(key, format!("expected an integer, got {}", value.kind())))
}

fn expect_str(key: &str, value: &Scalar) -> Result<String, ConfigError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::invalid(key, format!("expected a string, got {}", value.kind())))
}
