//! Observability wiring.
//!
//! Installs a `tracing-subscriber` registry with:
//!
//! - an `EnvFilter` (`RUST_LOG` wins; otherwise the configured default level),
//! - a JSON formatting layer on stdout,
//! - when an OTLP endpoint is configured, a `tracing-opentelemetry` layer that
//!   batches spans to the collector over gRPC.
//!
//! All `tracing` spans and events emitted by every crate in the workspace flow
//! through these layers.

use anyhow::Context;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::ServiceConfig;

const TRACER_NAME: &str = "hookstream";

/// Keeps the span exporter alive; flush it with [`TelemetryGuard::shutdown`].
pub struct TelemetryGuard {
    provider: Option<TracerProvider>,
}

impl TelemetryGuard {
    /// Flushes pending spans. Call once, just before the process exits.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "Failed to flush span exporter");
            }
        }
    }
}

/// Installs the global subscriber. Must run inside the tokio runtime when an
/// OTLP endpoint is configured.
pub fn init(config: &ServiceConfig) -> anyhow::Result<TelemetryGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_level));

    let provider = config
        .otlp_endpoint
        .as_deref()
        .map(otlp_provider)
        .transpose()?;

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(TRACER_NAME)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
        .with(otel_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    if let (Some(provider), Some(endpoint)) = (&provider, &config.otlp_endpoint) {
        opentelemetry::global::set_tracer_provider(provider.clone());
        tracing::info!(%endpoint, "OTLP span export enabled");
    }

    Ok(TelemetryGuard { provider })
}

fn otlp_provider(endpoint: &str) -> anyhow::Result<TracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .with_context(|| format!("failed to build OTLP exporter for {endpoint}"))?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .build())
}
