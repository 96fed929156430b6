// Infrastructure layer (shared components)
pub mod infrastructure;

// Re-export infrastructure modules at the crate root
pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::metrics;

// Domain layer
pub mod channel;
pub mod package;
pub mod publisher;
pub mod target;
pub mod template;

// Application layer
pub mod api;
pub mod cli;
pub mod server;
pub mod sse;

// Supporting modules
pub mod shutdown;
pub mod telemetry;
