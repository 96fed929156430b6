use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::PublishError;
use crate::metrics::PublishMetrics;
use crate::target::Target;

use super::Transport;

/// Derive the channel for `target` under `base`.
///
/// The unset target publishes on `base` itself, every named target on
/// `base/<name>`. An empty base is a configuration error.
pub fn derive_channel(base: &str, target: &Target) -> Result<String, PublishError> {
    if base.trim().is_empty() {
        return Err(PublishError::MissingChannel);
    }
    Ok(match target.value() {
        None => base.to_string(),
        Some(name) => format!("{}/{}", base, name),
    })
}

/// One successful publish
#[derive(Debug, Clone)]
pub struct PublishRecord<H> {
    pub channel: String,
    pub target: Target,
    pub handle: H,
    pub published_at: DateTime<Utc>,
    pub bytes: usize,
}

/// Publishes documents on channels derived from one base name.
///
/// Endpoints are created on first use and reused afterwards. Every
/// successful publish appends a [`PublishRecord`], whose handle keeps the
/// endpoint alive for as long as the publisher lives.
pub struct ChannelPublisher<T: Transport> {
    transport: Arc<T>,
    base_channel: String,
    endpoints: HashMap<String, T::Handle>,
    records: Vec<PublishRecord<T::Handle>>,
}

impl<T: Transport> ChannelPublisher<T> {
    pub fn new(transport: Arc<T>, base_channel: impl Into<String>) -> Self {
        Self {
            transport,
            base_channel: base_channel.into(),
            endpoints: HashMap::new(),
            records: Vec::new(),
        }
    }

    pub fn base_channel(&self) -> &str {
        &self.base_channel
    }

    /// Latch `document` on the channel for `target` and mirror it as a
    /// parameter of the same name
    pub fn publish(
        &mut self,
        target: &Target,
        document: &str,
    ) -> Result<&PublishRecord<T::Handle>, PublishError> {
        let channel = derive_channel(&self.base_channel, target)?;

        let handle = match self.endpoints.get(&channel) {
            Some(handle) => handle.clone(),
            None => {
                let handle = self.transport.create_latched_channel(&channel)?;
                tracing::debug!(channel = %channel, "Created latched channel");
                self.endpoints.insert(channel.clone(), handle.clone());
                handle
            }
        };

        self.transport.publish(&handle, document)?;
        self.transport.mirror(&channel, document);
        PublishMetrics::record_published();

        tracing::info!(
            target_name = %target,
            channel = %channel,
            bytes = document.len(),
            "Published document"
        );

        self.records.push(PublishRecord {
            channel,
            target: target.clone(),
            handle,
            published_at: Utc::now(),
            bytes: document.len(),
        });
        Ok(&self.records[self.records.len() - 1])
    }

    /// All successful publishes, oldest first
    pub fn records(&self) -> &[PublishRecord<T::Handle>] {
        &self.records
    }

    /// Number of distinct channels with an endpoint
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }
}
