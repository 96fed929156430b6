//! Channel and parameter inspection endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::channel::ChannelInfo;
use crate::error::{AppError, Result};
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct ChannelListResponse {
    pub channels: Vec<ChannelInfo>,
    pub total_channels: usize,
}

#[derive(Debug, Serialize)]
pub struct ChannelDocumentResponse {
    pub name: String,
    pub sequence: u64,
    pub published_at: DateTime<Utc>,
    pub document: String,
}

#[derive(Debug, Serialize)]
pub struct ParameterListResponse {
    pub parameters: Vec<String>,
    pub total_parameters: usize,
}

#[derive(Debug, Serialize)]
pub struct ParameterResponse {
    pub name: String,
    pub value: String,
}

/// GET /channels - Channels holding a latched document
pub async fn list_channels(State(state): State<AppState>) -> Json<ChannelListResponse> {
    let channels = state.bus.channels();
    let total = channels.len();

    Json(ChannelListResponse {
        channels,
        total_channels: total,
    })
}

/// GET /channels/{*name} - Latched document of one channel
pub async fn get_channel(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ChannelDocumentResponse>> {
    let message = state
        .bus
        .latest(&name)
        .ok_or_else(|| AppError::NotFound(format!("Channel '{}' has no latched document", name)))?;

    Ok(Json(ChannelDocumentResponse {
        name,
        sequence: message.sequence,
        published_at: message.published_at,
        document: message.data.to_string(),
    }))
}

/// GET /parameters - Declared parameter names, sorted
pub async fn list_parameters(State(state): State<AppState>) -> Json<ParameterListResponse> {
    let parameters = state.bus.parameters().names();
    let total = parameters.len();

    Json(ParameterListResponse {
        parameters,
        total_parameters: total,
    })
}

/// GET /parameters/{*name} - Parameter mirror of a published document
pub async fn get_parameter(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ParameterResponse>> {
    let value = state
        .bus
        .parameters()
        .get(&name)
        .ok_or_else(|| AppError::NotFound(format!("Parameter '{}' is not declared", name)))?;

    Ok(Json(ParameterResponse { name, value }))
}
