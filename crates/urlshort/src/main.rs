//! urlshort: serve path redirects from a literal map and/or a YAML document.

use std::path::PathBuf;

use anyhow::Context;
use urlshort::config::RedirectConfig;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1).cloned())
        .or_else(|| args.get(1).filter(|a| !a.starts_with('-')).cloned())
        .or_else(|| std::env::var("URLSHORT_CONFIG").ok())
        .unwrap_or_else(|| "urlshort.toml".to_string());

    let yaml_override = args
        .iter()
        .position(|a| a == "--yaml")
        .and_then(|i| args.get(i + 1).cloned());

    let mut config = RedirectConfig::load(&config_path)
        .with_context(|| format!("failed to load configuration from {config_path}"))?;

    // CLI overrides take precedence over TOML and env vars
    if let Some(path) = yaml_override {
        config.mappings.yaml_file = Some(PathBuf::from(path));
    }

    // The tonic OTLP exporter needs a reactor, so the runtime comes first
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let _tracing_guard = urlshort_tracing::init_tracing(&config.tracing);

        tracing::info!(
            config_path = %config_path,
            listen_address = %config.server.listen_address,
            yaml_file = ?config.mappings.yaml_file,
            inline_paths = config.mappings.paths.len(),
            "Starting urlshort"
        );

        run(config).await
    })
}

async fn run(config: RedirectConfig) -> anyhow::Result<()> {
    // All load failures surface here, before the listener is bound
    let resolver = config
        .mappings
        .build_resolver()
        .context("failed to build redirect mapping")?;

    let mut paths: Vec<&str> = resolver.paths().collect();
    paths.sort_unstable();
    tracing::info!(count = paths.len(), paths = ?paths, "Redirect mapping loaded");

    urlshort::server::run(&config.server, resolver).await
}
