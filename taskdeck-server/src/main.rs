//! Taskdeck server -- personal task list service.
//!
//! An axum HTTP server exposing a position-ordered task list: create,
//! update, complete, defer, reorder, and delete tasks, plus ordered views
//! of active and completed work. State lives in a JSON snapshot file.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:7400
//! cargo run --bin taskdeck-server
//!
//! # Run on custom address with an explicit data file
//! cargo run --bin taskdeck-server -- --bind 127.0.0.1:8080 --data-file ./tasks.json
//!
//! # In-memory only (nothing written to disk)
//! cargo run --bin taskdeck-server -- --ephemeral
//! ```

use std::sync::Arc;

use clap::Parser;
use taskdeck_server::api;
use taskdeck_server::config::{CliArgs, ServerConfig};
use taskdeck_server::store::TaskStore;

#[tokio::main]
async fn main() {
    let cli = CliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting taskdeck server");

    let store = match &config.data_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading task snapshot");
            match TaskStore::open(path.clone()) {
                Ok(store) => store,
                Err(e) => {
                    tracing::error!(error = %e, "failed to load task snapshot");
                    std::process::exit(1);
                }
            }
        }
        None => {
            tracing::warn!("running ephemeral: tasks will not survive restart");
            TaskStore::in_memory()
        }
    };

    match api::start_server(&config.bind_addr, Arc::new(store)).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "taskdeck server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            std::process::exit(1);
        }
    }
}
