//! In-process latched transport.
//!
//! Each channel is a `tokio::sync::watch` channel holding the latest
//! message, which gives depth-1 latching for free: a receiver created after
//! a publish observes that value immediately, and a newer publish replaces
//! it. Channels exist only once created through the transport; subscribing
//! to a created channel that has no value yet still sees the first publish.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::watch;

use crate::error::PublishError;
use crate::metrics::PublishMetrics;

use super::{ParameterStore, Transport};

/// The value retained by a channel
#[derive(Debug, Clone)]
pub struct LatchedMessage {
    pub data: Arc<str>,
    /// Publish count on this channel, starting at 1
    pub sequence: u64,
    pub published_at: DateTime<Utc>,
}

type Slot = watch::Sender<Option<LatchedMessage>>;

/// Handle to one bus channel
#[derive(Debug, Clone)]
pub struct BusHandle {
    name: String,
    sender: Arc<Slot>,
}

/// Summary of a published channel
#[derive(Debug, Clone, Serialize)]
pub struct ChannelInfo {
    pub name: String,
    pub sequence: u64,
    pub published_at: DateTime<Utc>,
    pub bytes: usize,
    pub subscribers: usize,
}

#[derive(Debug, Default)]
pub struct LatchedBus {
    channels: DashMap<String, Arc<Slot>>,
    parameters: ParameterStore,
    /// Channels holding a value
    latched: AtomicUsize,
}

impl LatchedBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, name: &str) -> Arc<Slot> {
        self.channels
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(watch::channel(None).0))
            .clone()
    }

    /// Subscribe to a created channel; the receiver holds the latched
    /// value, if any. Unknown names return `None` and create nothing.
    pub fn subscribe(&self, name: &str) -> Option<watch::Receiver<Option<LatchedMessage>>> {
        self.channels.get(name).map(|slot| slot.subscribe())
    }

    /// The latched value of `name`
    pub fn latest(&self, name: &str) -> Option<LatchedMessage> {
        self.channels
            .get(name)
            .and_then(|slot| slot.borrow().clone())
    }

    /// Channels that hold a value, sorted by name
    pub fn channels(&self) -> Vec<ChannelInfo> {
        let mut infos: Vec<ChannelInfo> = self
            .channels
            .iter()
            .filter_map(|entry| {
                let slot = entry.value();
                let message = slot.borrow().clone()?;
                Some(ChannelInfo {
                    name: entry.key().clone(),
                    sequence: message.sequence,
                    published_at: message.published_at,
                    bytes: message.data.len(),
                    subscribers: slot.receiver_count(),
                })
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Number of created channels, with or without a value
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of channels holding a value
    pub fn latched_count(&self) -> usize {
        self.latched.load(Ordering::Relaxed)
    }

    /// Number of live subscribers across all channels
    pub fn subscriber_count(&self) -> usize {
        self.channels.iter().map(|e| e.value().receiver_count()).sum()
    }

    pub fn parameters(&self) -> &ParameterStore {
        &self.parameters
    }
}

impl Transport for LatchedBus {
    type Handle = BusHandle;

    fn create_latched_channel(&self, name: &str) -> Result<BusHandle, PublishError> {
        Ok(BusHandle {
            name: name.to_string(),
            sender: self.slot(name),
        })
    }

    fn publish(&self, handle: &BusHandle, document: &str) -> Result<(), PublishError> {
        let data: Arc<str> = Arc::from(document);
        let mut sequence = 0;
        handle.sender.send_modify(|slot| {
            sequence = slot.as_ref().map_or(1, |previous| previous.sequence + 1);
            *slot = Some(LatchedMessage {
                data,
                sequence,
                published_at: Utc::now(),
            });
        });

        if sequence == 1 {
            let latched = self.latched.fetch_add(1, Ordering::Relaxed) + 1;
            PublishMetrics::set_channels_latched(latched);
        }
        tracing::trace!(channel = %handle.name, sequence, "Latched value replaced");

        Ok(())
    }

    fn mirror(&self, name: &str, document: &str) {
        self.parameters.set(name, document);
    }
}
