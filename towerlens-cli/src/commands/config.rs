//! Configuration inspection commands.

use std::path::Path;

use clap::Subcommand;
use towerlens::config::{config_file_path, to_config_string, ConfigFile};

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,
    /// Print the effective configuration
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config: &ConfigFile, explicit_path: Option<&Path>) {
    match command {
        ConfigCommands::Path => {
            let path = explicit_path
                .map(Path::to_path_buf)
                .unwrap_or_else(config_file_path);
            let note = if path.exists() { "" } else { " (not created, using defaults)" };
            println!("{}{}", path.display(), note);
        }
        ConfigCommands::Show => print!("{}", to_config_string(config)),
    }
}
