//! Health endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::publisher::TargetFailure;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub channels: ChannelHealthResponse,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_targets: Vec<TargetFailure>,
}

#[derive(Debug, Serialize)]
pub struct ChannelHealthResponse {
    pub published: usize,
    /// Channels created, including ones whose render never produced a value
    pub created: usize,
    pub latched: usize,
    pub subscribers: usize,
}

/// GET /health
///
/// `degraded` when at least one target failed to render.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.report.failed.is_empty() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        channels: ChannelHealthResponse {
            published: state.report.published.len(),
            created: state.bus.channel_count(),
            latched: state.bus.latched_count(),
            subscribers: state.bus.subscriber_count(),
        },
        failed_targets: state.report.failed.clone(),
    })
}
