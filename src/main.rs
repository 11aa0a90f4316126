//! quiet-news — binary entrypoint.
//! Seeds the snapshot cache, starts the refresh loop, and serves the Axum router
//! until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quiet_news::config::{AppConfig, Cli};
use quiet_news::feed::providers::hn_http::HnClient;
use quiet_news::metrics::Metrics;
use quiet_news::{api, AppState, ItemSource, RefreshLoop, SnapshotCache};

/// Compact logs by default; JSON lines when QUIET_NEWS_LOG_JSON=1.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quiet_news=info,warn"));
    let json = std::env::var("QUIET_NEWS_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        return token.cancelled().await;
    }
    info!("shutdown requested");
    token.cancel();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = AppConfig::load(&cli)?;
    info!(?cfg, "config loaded");

    let metrics = Metrics::init(cfg.num_stories, cfg.refresh_interval.as_secs())?;

    let source: Arc<dyn ItemSource> = Arc::new(HnClient::new(&cfg.api_base)?);
    let cache = Arc::new(SnapshotCache::new(source, cfg.max_in_flight));

    // Seed before accepting traffic so the first readers see real stories.
    let shutdown = CancellationToken::new();
    let refresher = RefreshLoop::new(Arc::clone(&cache), cfg.num_stories, cfg.refresh_interval)
        .seed()
        .await
        .spawn(shutdown.clone());

    let app = api::router(AppState::new(cache)).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .with_context(|| format!("binding port {}", cfg.port))?;
    info!(port = cfg.port, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .context("http server")?;

    shutdown.cancel();
    if let Err(e) = refresher.await {
        warn!(error = %e, "refresh task ended abnormally");
    }
    Ok(())
}
