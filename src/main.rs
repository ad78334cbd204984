mod api;
mod config;
mod db;
mod entities;
mod errors;
mod services;
mod store;
mod system;

use std::error::Error;
use std::sync::Arc;

use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use secrecy::ExposeSecret;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::AppConfig;
use crate::db::init_db;
use crate::errors::IngestError;
use crate::services::ingestion::IngestionTask;
use crate::services::key_rotation::KeyRotator;
use crate::services::scheduler::spawn_ingestion;
use crate::services::youtube_search::YoutubeSearchClient;
use crate::store::VideoStore;

#[derive(Clone)]
pub struct InnerState {
    pub store: Arc<dyn VideoStore>,
    /// The term the ingestion task searches for, shown on the dashboard.
    pub search_query: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "video_fetcher=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let store = init_db(config.database_url.expose_secret(), config.db_max_connections).await?;

    let ingestion = if config.ingestion_enabled {
        let keys = KeyRotator::from_csv(config.youtube_api_keys.expose_secret());
        if keys.is_empty() {
            return Err(IngestError::Configuration(
                "YOUTUBE_API_KEYS must list at least one key when ingestion is enabled".to_string(),
            )
            .into());
        }
        tracing::info!("Loaded {} YouTube API keys", keys.len());

        let search = YoutubeSearchClient::new(&config.youtube_api_base_url, config.youtube_timeout)?;
        let task = IngestionTask::new(
            store.clone(),
            Arc::new(search),
            Arc::new(keys),
            config.search_query.clone(),
        );
        Some(spawn_ingestion(Arc::new(task), config.fetch_interval))
    } else {
        tracing::info!("Ingestion disabled; serving stored videos only");
        None
    };

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app_state = InnerState {
        store,
        search_query: config.search_query.clone(),
    };

    let app = api::create_router(app_state)
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = ingestion {
        handle.abort();
    }
    tracing::info!("Server shut down gracefully");

    Ok(())
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
