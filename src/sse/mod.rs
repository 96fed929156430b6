//! Server-Sent Events subscription to a latched channel.
//!
//! # Endpoint
//!
//! `GET /sse/{*name}`
//!
//! # Event Types
//!
//! - `document` - The latched document; sent on connect when the channel
//!   already holds one, then again after every publish. The event id is the
//!   channel's publish sequence number.
//!
//! Streams end when the process shuts down.

mod handler;

pub use handler::sse_handler;
