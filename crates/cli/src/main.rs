//! Hookstream entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: flags with environment fallbacks, validated
//!    into a [`config::ServiceConfig`].
//! 2. **Wire observability**: `tracing-subscriber` with a JSON layer and an
//!    optional OpenTelemetry OTLP exporter (see [`telemetry`]).
//! 3. **Construct infrastructure**: open the selected event store and inject
//!    it into the listener's dispatcher and query service.
//! 4. **Serve**: run the webhook listener until Ctrl-C, then flush telemetry.

mod config;
mod telemetry;

use anyhow::Context;
use clap::Parser;
use listener::{ApiState, WebhookServer};

use crate::config::{Cli, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;
    let telemetry = telemetry::init(&config)?;

    let result = run(&config).await;
    if let Err(e) = &result {
        tracing::error!(error = ?e, "Hookstream stopped with an error");
    }

    telemetry.shutdown();
    result
}

async fn run(config: &ServiceConfig) -> anyhow::Result<()> {
    let store = store::open_store(&config.backend).context("failed to open event store")?;
    let server = WebhookServer::bind(&config.bind_addr, ApiState::new(store))?;
    let shutdown = server.shutdown_handle();

    tracing::info!(
        bind_addr = %config.bind_addr,
        backend = %config.backend,
        "Hookstream starting"
    );

    let mut serving = tokio::spawn(server.run());
    tokio::select! {
        finished = &mut serving => {
            finished.context("listener task failed")??;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            tracing::info!("Shutdown requested");
            shutdown.shutdown();
            serving.await.context("listener task failed")??;
        }
    }

    Ok(())
}
