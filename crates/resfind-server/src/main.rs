mod api;
mod middleware;
mod quota;

use std::sync::Arc;

use resfind_core::ZipGeocoder;
use resfind_search::RankingEngine;
use resfind_upstream::{UpstreamClient, UpstreamSettings};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use crate::quota::SearchQuota;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = resfind_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let taxonomy = Arc::new(resfind_core::load_taxonomy(&config.taxonomy_path)?);
    let geocoder = Arc::new(ZipGeocoder::load(&config.zip_table_path)?);
    tracing::info!(
        env = %config.env,
        categories = taxonomy.categories().len(),
        zip_codes = geocoder.len(),
        "reference data loaded"
    );

    let upstream = UpstreamClient::new(&UpstreamSettings::from_app_config(&config))?;
    let engine = Arc::new(RankingEngine::new(upstream, taxonomy, geocoder));
    let quota = SearchQuota::per_minute(config.search_rate_limit_per_min);
    let app = build_app(AppState { engine }, quota);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
