use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod cli;
mod config_cmds;
mod doctor;
mod launcher;
mod logging;
mod site;
mod stop_cmd;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let guard = logging::init(cli.verbose, cli.log_file.as_deref())?;
    let format = cli.format;

    let code = match cli.command {
        Commands::Resolve { path } => {
            let tree = site::locate(&cli.site)?.load_tree()?;
            config_cmds::handle_resolve(&tree, &path, format)?;
            0
        }
        Commands::Sections => {
            let tree = site::locate(&cli.site)?.load_tree()?;
            config_cmds::handle_sections(&tree, format)?;
            0
        }
        Commands::Check => {
            let files = site::locate(&cli.site)?;
            config_cmds::handle_check(&files, format)?
        }
        Commands::Show => {
            let tree = site::locate(&cli.site)?.load_tree()?;
            config_cmds::handle_show(&tree, format)?;
            0
        }
        Commands::Doctor => doctor::run_doctor(&cli.site, format)?,
        Commands::Start { args } => {
            debug!(server_options = ?args, "Start requested");
            let system = site::load_system(&cli.site)?;
            launcher::handle_start(&system, launcher::forwarded_args(std::env::args_os()))?
        }
        Commands::Stop => {
            let system = site::load_system(&cli.site)?;
            stop_cmd::handle_stop(&system.root_path)?;
            0
        }
    };

    // Flush the file log before exiting.
    drop(guard);
    std::process::exit(code);
}
