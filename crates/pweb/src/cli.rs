use clap::{Args, Parser, Subcommand};
use pweb_core::OutputFormat;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pweb", version)]
#[command(about = "pweb: site configuration resolver and launcher for the rnet web server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub site: SiteArgs,

    /// Output format (text or json)
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Where to find the installation and its site configuration.
#[derive(Args, Clone, Debug, Default)]
pub struct SiteArgs {
    /// Site configuration file (defaults to <root>/web/site.conf)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override file layered on top of the site configuration
    #[arg(long = "override", global = true)]
    pub override_path: Option<PathBuf>,

    /// Installation root (defaults to root_path from the system config)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// System config file (defaults to $PWEB_SYSTEM_CONF or /etc/rnet.conf)
    #[arg(long, global = true)]
    pub system_conf: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the resolved tool plan for a request path
    Resolve {
        /// Request path, e.g. /images/cat.png
        path: String,
    },

    /// List configured sections in declaration order
    Sections,

    /// Validate the site configuration
    Check,

    /// Show global server settings
    Show,

    /// Check the installation root, search path, and required modules
    Doctor,

    /// Verify required modules, then hand off to the server program.
    /// The whole command line, including `start`, is forwarded unchanged.
    Start {
        /// Server program options
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },

    /// Stop the running server via its pid file
    Stop,
}
