//! Report what the state store currently holds for each target.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use sheetsync_core::sync::build_store;
use sheetsync_core::{CoreError, GoogleAuth, StateStore};

use super::{load_config, load_secrets, runtime, CommandResult};

pub fn run(config_path: Option<&Path>, json: bool) -> CommandResult {
    let config = load_config(config_path)?;
    let secrets = load_secrets(&config)?;
    let targets = config.resolve_targets()?;

    let records = runtime()?.block_on(async {
        let auth = Arc::new(GoogleAuth::new(
            secrets.oauth_config(&config.google.token_url),
            (&secrets.google.token).into(),
        ));
        let store = build_store(&config, &secrets, auth)?;

        let mut records = Vec::with_capacity(targets.len());
        for target in &targets {
            records.push(store.read(&target.destination_key).await?);
        }
        Ok::<_, CoreError>(records)
    })?;

    if json {
        let entries: Vec<_> = targets
            .iter()
            .zip(&records)
            .map(|(target, record)| {
                json!({
                    "table": target.destination_key,
                    "sheet": target.source_document_id,
                    "lastFileUpdate": record.as_ref().map(|r| r.last_file_update.as_str()),
                    "communities": record.as_ref().and_then(|r| r.data.as_ref()).map(Vec::len),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for (target, record) in targets.iter().zip(&records) {
        let watermark = record
            .as_ref()
            .map(|r| r.last_file_update.as_str())
            .unwrap_or("never synced");
        let communities = record
            .as_ref()
            .and_then(|r| r.data.as_ref())
            .map_or(0, Vec::len);
        println!(
            "{:<24} {:<46} {} ({} communities)",
            target.destination_key, target.source_document_id, watermark, communities
        );
    }
    Ok(())
}
