pub mod auth;
pub mod config;
pub mod once;
pub mod run;
pub mod status;

use std::path::Path;

use sheetsync_core::{Config, Secrets};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::load(path)?)
}

pub(crate) fn load_secrets(config: &Config) -> Result<Secrets, Box<dyn std::error::Error>> {
    Ok(Secrets::load(&config.secrets_path())?)
}

pub(crate) fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}
