use axum::{routing::get, Router};

use crate::server::AppState;

use super::channels::{get_channel, get_parameter, list_channels, list_parameters};
use super::health::health;
use super::metrics::prometheus_metrics;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        // Channel names contain '/', hence the wildcard captures
        .route("/channels", get(list_channels))
        .route("/channels/{*name}", get(get_channel))
        .route("/parameters", get(list_parameters))
        .route("/parameters/{*name}", get(get_parameter))
}
