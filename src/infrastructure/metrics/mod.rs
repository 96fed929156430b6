//! Prometheus metrics for the resource publisher.
//!
//! This module provides:
//! - Publish metrics (documents published, channels holding a value)
//! - Render metrics (failures, duration)
//! - Subscriber metrics (live SSE subscribers)

mod helpers;

pub use helpers::{encode_metrics, PublishMetrics, RenderMetrics, SubscriberMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "resource_publisher";

lazy_static! {
    // ============================================================================
    // Publish Metrics
    // ============================================================================

    /// Total documents published
    pub static ref DOCUMENTS_PUBLISHED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_documents_published_total", METRIC_PREFIX),
        "Total documents published on latched channels"
    ).unwrap();

    /// Channels currently holding a latched value
    pub static ref CHANNELS_LATCHED: IntGauge = register_int_gauge!(
        format!("{}_channels_latched", METRIC_PREFIX),
        "Number of channels holding a latched document"
    ).unwrap();

    // ============================================================================
    // Render Metrics
    // ============================================================================

    /// Targets skipped because their template failed to render
    pub static ref RENDER_FAILURES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_render_failures_total", METRIC_PREFIX),
        "Total targets whose template failed to render"
    ).unwrap();

    /// Time spent rendering one target
    pub static ref RENDER_DURATION: Histogram = register_histogram!(
        format!("{}_render_duration_seconds", METRIC_PREFIX),
        "Template render duration in seconds",
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    ).unwrap();

    // ============================================================================
    // Subscriber Metrics
    // ============================================================================

    /// Live SSE subscribers across all channels
    pub static ref SUBSCRIBERS_ACTIVE: IntGauge = register_int_gauge!(
        format!("{}_subscribers_active", METRIC_PREFIX),
        "Number of connected SSE subscribers"
    ).unwrap();
}
