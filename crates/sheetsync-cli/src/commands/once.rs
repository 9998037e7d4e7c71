use std::path::Path;

use sheetsync_core::build_scheduler;

use super::{load_config, load_secrets, runtime, CommandResult};

pub fn run(config_path: Option<&Path>, json: bool) -> CommandResult {
    let config = load_config(config_path)?;
    let secrets = load_secrets(&config)?;

    let summary = runtime()?.block_on(async {
        let scheduler = build_scheduler(&config, &secrets)?;
        scheduler.run_pass().await
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for table in &summary.updated {
            println!("updated    {table}");
        }
        for table in &summary.unchanged {
            println!("unchanged  {table}");
        }
        println!(
            "{} of {} targets updated",
            summary.updated.len(),
            summary.processed()
        );
    }
    Ok(())
}
