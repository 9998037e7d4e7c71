use std::path::Path;

use sheetsync_core::integrations::oauth;
use sheetsync_core::storage::secrets::StoredToken;

use super::{load_config, load_secrets, runtime, CommandResult};

pub fn run(config_path: Option<&Path>, print: bool) -> CommandResult {
    let config = load_config(config_path)?;
    let mut secrets = load_secrets(&config)?;
    let oauth_config = secrets.oauth_config(&config.google.token_url);

    println!("Opening the browser for Google authorization...");
    let tokens = runtime()?.block_on(oauth::authorize(&oauth_config))?;
    let token = StoredToken::from(&tokens);

    if print {
        println!("{}", serde_json::to_string_pretty(&token)?);
        return Ok(());
    }

    let path = config.secrets_path();
    secrets.google.token = token;
    std::fs::write(&path, serde_json::to_string_pretty(&secrets)?)?;
    println!("Google token saved to {}", path.display());
    Ok(())
}
