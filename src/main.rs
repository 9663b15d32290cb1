mod api;
mod config;
mod error;
mod lifecycle;
mod models;
mod observability;
mod routing;
mod service;
mod state;
mod store;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::observability::metrics::Metrics;
use crate::routing::client::OpenRouteClient;
use crate::routing::estimator::RouteEstimator;
use crate::service::DeliveryService;
use crate::store::DeliveryStore;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    if config.routing_api_key.is_empty() {
        tracing::warn!(
            "OPENROUTE_API_KEY is not set, deliveries will be created without route data"
        );
    }

    let metrics = Arc::new(Metrics::new());
    let provider = OpenRouteClient::new(
        &config.routing_base_url,
        &config.routing_api_key,
        Duration::from_secs(config.routing_timeout_secs),
    )?;
    let estimator = RouteEstimator::new(Arc::new(provider));
    let store = Arc::new(DeliveryStore::new());
    let service = DeliveryService::new(store.clone(), estimator, metrics.clone());

    let shared_state = Arc::new(state::AppState::new(service, store, metrics));
    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| error::AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| error::AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
