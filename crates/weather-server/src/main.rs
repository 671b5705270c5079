mod cache;
mod config;
mod error;
mod http;
mod model;
mod router;
mod server;
mod upstream;

use cache::build_cache;
use config::Config;
use router::Handler;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use upstream::OpenWeatherClient;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load config
    let config = if Path::new("config.toml").exists() {
        match Config::load(Path::new("config.toml")) {
            Ok(c) => {
                tracing::info!("loaded config from config.toml");
                c
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load config.toml, using defaults");
                Config::default_config()
            }
        }
    } else {
        tracing::info!("no config.toml found, using defaults");
        Config::default_config()
    };

    let api_key = config.api_key();
    if api_key.is_empty() {
        tracing::warn!(
            "no API key configured (config.toml [upstream].api_key or OPENWEATHER_API_KEY); \
             upstream fetches will be rejected"
        );
    }

    let ttl = Duration::from_secs(config.cache.ttl_seconds);
    let provider = OpenWeatherClient::new(
        config.upstream.host.clone(),
        config.upstream.port,
        api_key,
        Duration::from_millis(config.upstream.timeout_ms),
    );

    let handler = Arc::new(Handler::new(
        build_cache(config.cache.capacity),
        build_cache(config.cache.capacity),
        provider,
        config.weather.default_country.clone(),
        ttl,
        config.cache.sweep_every_requests,
    ));

    let listen_addr = config.server.listen_addr.clone();
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {listen_addr}: {e}"));

    tracing::info!(
        addr = %listen_addr,
        upstream = %config.upstream.host,
        ttl_seconds = config.cache.ttl_seconds,
        default_country = %config.weather.default_country,
        "weather server listening"
    );
    tracing::info!("endpoints: GET /  GET /weather?city=..&country=..  GET /forecast?city=..&country=..");

    // Shutdown token for graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal(shutdown_clone).await;
    });

    server::run(listener, handler, shutdown).await;

    tracing::info!("weather server shut down");
}

/// Listen for SIGINT (Ctrl+C) or SIGTERM and cancel the shutdown token.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }

    tracing::info!("shutdown signal received, finishing in-flight requests...");
    token.cancel();
}
