//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{
    CHANNELS_LATCHED, DOCUMENTS_PUBLISHED_TOTAL, RENDER_DURATION, RENDER_FAILURES_TOTAL,
    SUBSCRIBERS_ACTIVE,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording publish metrics
pub struct PublishMetrics;

impl PublishMetrics {
    /// Record a successful publish
    pub fn record_published() {
        DOCUMENTS_PUBLISHED_TOTAL.inc();
    }

    /// Set the number of channels holding a value
    pub fn set_channels_latched(count: usize) {
        CHANNELS_LATCHED.set(count as i64);
    }
}

/// Helper struct for recording render metrics
pub struct RenderMetrics;

impl RenderMetrics {
    /// Record a target skipped after a render failure
    pub fn record_failure() {
        RENDER_FAILURES_TOTAL.inc();
    }

    pub fn record_duration(elapsed: Duration) {
        RENDER_DURATION.observe(elapsed.as_secs_f64());
    }
}

/// Helper struct for recording subscriber metrics
pub struct SubscriberMetrics;

impl SubscriberMetrics {
    pub fn record_connected() {
        SUBSCRIBERS_ACTIVE.inc();
    }

    pub fn record_disconnected() {
        SUBSCRIBERS_ACTIVE.dec();
    }
}
