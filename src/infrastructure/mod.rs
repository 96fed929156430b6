//! Infrastructure layer modules
//!
//! This module contains shared infrastructure components:
//! - `config`: Layered settings
//! - `error`: Unified error types and process exit codes
//! - `metrics`: Prometheus metrics helpers

pub mod config;
pub mod error;
pub mod metrics;
