//! Subscriber setup: stderr logging plus optional OTLP span export.

use anyhow::Result;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{OtlpProtocol, TracingConfig};

/// RAII guard that flushes and shuts down the tracer provider on drop.
///
/// Hold it for the lifetime of the process.
pub struct TracingGuard {
    provider: Option<SdkTracerProvider>,
}

impl TracingGuard {
    /// Whether spans are being exported over OTLP.
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(ref mut provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shutdown tracer provider: {e}");
            }
        }
    }
}

/// Install the global subscriber.
///
/// Without an `otlp_endpoint` only the stderr fmt layer is installed. If the
/// exporter cannot be built the service still starts with fmt-only logging
/// and a warning is emitted once the subscriber is up.
pub fn init_tracing(config: &TracingConfig) -> TracingGuard {
    let Some(endpoint) = config.otlp_endpoint.as_deref() else {
        init_fmt_only(&config.log_level);
        return TracingGuard { provider: None };
    };

    match try_init_with_otlp(config, endpoint) {
        Ok(guard) => guard,
        Err(e) => {
            init_fmt_only(&config.log_level);
            tracing::warn!(
                error = %e,
                endpoint = %endpoint,
                "OTLP exporter failed to initialize, running with fmt-only tracing"
            );
            TracingGuard { provider: None }
        }
    }
}

/// Parse a filter directive, falling back to `info` when it is invalid.
pub(crate) fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_fmt_only(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(build_filter(log_level))
        .init();
}

fn try_init_with_otlp(config: &TracingConfig, endpoint: &str) -> Result<TracingGuard> {
    let exporter = match config.protocol {
        OtlpProtocol::Grpc => opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()?,
        OtlpProtocol::Http => opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .build()?,
    };

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            opentelemetry_sdk::Resource::builder_empty()
                .with_service_name(config.service_name.clone())
                .build(),
        )
        .build();

    let tracer = provider.tracer(config.service_name.clone());

    tracing_subscriber::registry()
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(build_filter(&config.log_level))
        .init();

    tracing::info!(
        endpoint = %endpoint,
        service = %config.service_name,
        protocol = ?config.protocol,
        "OpenTelemetry OTLP tracing initialized"
    );

    Ok(TracingGuard {
        provider: Some(provider),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_filter_is_kept() {
        let filter = build_filter("urlshort=debug");
        assert_eq!(filter.to_string(), "urlshort=debug");
    }

    #[test]
    fn test_invalid_filter_falls_back_to_info() {
        let filter = build_filter("urlshort=notalevel");
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn test_guard_without_provider_is_not_exporting() {
        let guard = TracingGuard { provider: None };
        assert!(!guard.is_exporting());
    }
}
