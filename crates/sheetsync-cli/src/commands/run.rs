//! The long-running daemon loop.

use std::path::Path;

use sheetsync_core::{build_scheduler, CoreError};

use super::{load_config, load_secrets, runtime, CommandResult};

pub fn run(config_path: Option<&Path>) -> CommandResult {
    let config = load_config(config_path)?;
    let secrets = load_secrets(&config)?;

    runtime()?.block_on(async {
        let scheduler = build_scheduler(&config, &secrets)?;
        let passes = scheduler.run_until(shutdown_signal()).await;
        tracing::info!(passes, "exiting");
        Ok::<_, CoreError>(())
    })?;
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown requested");
}
