//! Service wiring: store, recommendation client, controller and routes.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::advisor::{AdvisorRouteState, ConversationController, advisor_routes};
use crate::client::{HttpRecommendationClient, RecommendationClient};
use crate::config::AdvisorConfig;
use crate::error::Result;
use crate::store::{LibSqlStore, RecommendationStore};

/// Open the store, build the client and controller, and return the router.
pub async fn build_router(config: &AdvisorConfig) -> Result<Router> {
    let store: Arc<dyn RecommendationStore> = Arc::new(LibSqlStore::new_local(&config.db_path).await?);
    let client: Arc<dyn RecommendationClient> =
        Arc::new(HttpRecommendationClient::new(&config.client)?);

    let controller = Arc::new(ConversationController::new(
        client,
        store,
        config.conversation.clone(),
    ));
    controller.open().await;

    Ok(advisor_routes(AdvisorRouteState { controller }).layer(CorsLayer::permissive()))
}

/// Serve the advisor API on `0.0.0.0:{port}` until the process exits.
pub async fn run(config: AdvisorConfig) -> Result<()> {
    let app = build_router(&config).await?;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!(port = config.port, db = %config.db_path.display(), "Advisor server started");
    axum::serve(listener, app).await?;
    Ok(())
}
