//! HTTP surface: read API, dashboard and health routes.

pub mod common;
pub mod dashboard;
pub mod videos;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::common::http_trace::trace_layer;
use crate::system::health_check;
use crate::InnerState;

/// Creates the application router
#[tracing::instrument(name = "create_router", skip(state))]
pub fn create_router(state: InnerState) -> Router {
    tracing::info!("Creating API router");

    Router::new()
        .route("/", get(health_check::root))
        .route("/health", get(health_check::health_check))
        .route("/videos", get(videos::list_videos))
        .route("/dashboard", get(dashboard::dashboard))
        .layer(CorsLayer::permissive())
        .layer(trace_layer())
        .with_state(state)
}
