//! API layer - HTTP endpoint handlers for inspecting latched channels.

mod channels;
mod health;
mod metrics;
mod routes;

pub use channels::{get_channel, get_parameter, list_channels, list_parameters};
pub use channels::{
    ChannelDocumentResponse, ChannelListResponse, ParameterListResponse, ParameterResponse,
};
pub use health::{health, HealthResponse};
pub use metrics::prometheus_metrics;
pub use routes::api_routes;
