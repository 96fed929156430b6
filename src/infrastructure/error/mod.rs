use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::package::LocateError;
use crate::telemetry::TelemetryError;

/// Process exit status for configuration errors
pub const CONFIGURATION_EXIT_CODE: i32 = 254;

/// Fatal setup errors; nothing is published once one occurs
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// Rendered clap message, including usage
    #[error("{0}")]
    Arguments(#[from] clap::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error(transparent)]
    Package(#[from] LocateError),

    #[error("Cannot read template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigurationError {
    pub fn exit_code(&self) -> i32 {
        CONFIGURATION_EXIT_CODE
    }
}

/// Publish errors; fatal because no channel can be derived
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("Base channel name is empty; set -topic")]
    MissingChannel,
}

/// Errors returned by the HTTP surface
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
        };

        tracing::debug!(code = %code, status = %status.as_u16(), message = %message, "API error");

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
