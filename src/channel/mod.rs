//! Latched channels.
//!
//! This module provides:
//! - [`Transport`]: the three capabilities the publisher needs from a host
//!   messaging runtime (create a latched channel, publish, mirror a value as
//!   a named parameter)
//! - [`LatchedBus`]: the in-process transport, one depth-1 watch channel per
//!   channel name
//! - [`ChannelPublisher`]: channel naming, endpoint reuse and publish records

mod bus;
mod parameters;
mod publisher;

pub use bus::{BusHandle, ChannelInfo, LatchedBus, LatchedMessage};
pub use parameters::ParameterStore;
pub use publisher::{derive_channel, ChannelPublisher, PublishRecord};

use crate::error::PublishError;

/// Host messaging runtime as seen by the publisher.
///
/// A latched channel retains exactly one message: the newest publish
/// replaces the previous value and is delivered to subscribers that join
/// afterwards.
pub trait Transport: Send + Sync {
    /// Keeps the channel's endpoint alive while held
    type Handle: Clone + Send + Sync;

    /// Create, or return the existing, latched channel `name`
    fn create_latched_channel(&self, name: &str) -> Result<Self::Handle, PublishError>;

    /// Replace the retained value of the channel behind `handle`
    fn publish(&self, handle: &Self::Handle, document: &str) -> Result<(), PublishError>;

    /// Expose `document` as a read-only parameter called `name`
    fn mirror(&self, name: &str, document: &str);
}
