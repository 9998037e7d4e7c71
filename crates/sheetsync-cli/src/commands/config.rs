use std::path::Path;

use clap::Subcommand;
use sheetsync_core::Config;

use super::{load_config, CommandResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the resolved targets in sync order
    Targets,
    /// Print the default config file location
    Path,
}

pub fn run(config_path: Option<&Path>, action: ConfigAction) -> CommandResult {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Targets => {
            let config = load_config(config_path)?;
            for target in config.resolve_targets()? {
                println!("{}\t{}", target.destination_key, target.source_document_id);
            }
        }
        ConfigAction::Path => match config_path {
            Some(path) => println!("{}", path.display()),
            None => println!("{}", Config::default_path()?.display()),
        },
    }
    Ok(())
}
