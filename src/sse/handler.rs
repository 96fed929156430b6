//! SSE handler implementation.

use std::convert::Infallible;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures::stream::Stream;
use tokio::sync::watch;

use crate::channel::LatchedMessage;
use crate::error::AppError;
use crate::metrics::SubscriberMetrics;
use crate::server::AppState;

const DOCUMENT_EVENT: &str = "document";

/// SSE subscription handler; 404 for channels that were never created
#[tracing::instrument(name = "sse.subscribe", skip(state))]
pub async fn sse_handler(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(rx) = state.bus.subscribe(&name) else {
        return AppError::NotFound(format!("Channel '{}' does not exist", name)).into_response();
    };
    let shutdown = state.shutdown.subscribe();

    tracing::info!(channel = %name, "SSE subscriber connected");

    let stream = create_sse_stream(name, rx, shutdown);

    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(state.settings.server.sse_keepalive_secs))
                .text("keep-alive"),
        )
        .into_response()
}

fn document_event(message: &LatchedMessage) -> Event {
    Event::default()
        .event(DOCUMENT_EVENT)
        .id(message.sequence.to_string())
        .data(&*message.data)
}

/// Stream the latched value, then every later publish, until shutdown
fn create_sse_stream(
    channel: String,
    mut rx: watch::Receiver<Option<LatchedMessage>>,
    mut shutdown: watch::Receiver<bool>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let cleanup_guard = CleanupGuard::new(channel);

    async_stream::stream! {
        // Hold the cleanup guard - it will be dropped when the stream ends
        let _guard = cleanup_guard;

        let latched = rx.borrow_and_update().clone();
        if let Some(message) = latched {
            yield Ok(document_event(&message));
        }

        loop {
            let changed = tokio::select! {
                result = rx.changed() => result.is_ok(),
                _ = shutdown.wait_for(|stopped| *stopped) => false,
            };
            if !changed {
                break;
            }

            let latest = rx.borrow_and_update().clone();
            if let Some(message) = latest {
                yield Ok(document_event(&message));
            }
        }
    }
}

/// Guard that records the subscriber's departure when dropped
struct CleanupGuard {
    channel: String,
    connected_at: Instant,
}

impl CleanupGuard {
    fn new(channel: String) -> Self {
        SubscriberMetrics::record_connected();
        Self {
            channel,
            connected_at: Instant::now(),
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        SubscriberMetrics::record_disconnected();
        tracing::info!(
            channel = %self.channel,
            duration_secs = self.connected_at.elapsed().as_secs_f64(),
            "SSE subscriber disconnected"
        );
    }
}
