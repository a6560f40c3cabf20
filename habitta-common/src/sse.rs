//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE plumbing for Habitta services: a broadcast-backed event
//! stream for domain events plus the connection-status/heartbeat frames
//! every stream carries.

use crate::events::HabittaEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info};

/// Broadcast fan-out for domain events to all connected SSE clients
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<HabittaEvent>,
}

impl EventBroadcaster {
    /// Create a broadcaster buffering up to `capacity` events per client
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Broadcast an event, ignoring if no clients are connected
    pub fn broadcast_lossy(&self, event: HabittaEvent) {
        if let Ok(count) = self.tx.send(event) {
            debug!("Broadcast event to {} clients", count);
        }
    }

    /// Current number of connected clients
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// SSE stream for a new client connection: initial connection
    /// status, then domain events as they arrive.
    pub fn subscribe_stream(
        &self,
        service_name: &'static str,
    ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        info!("New SSE client connected to {} events", service_name);

        let rx = self.tx.subscribe();
        let events = BroadcastStream::new(rx).filter_map(|result| async move {
            match result {
                Ok(event) => Event::default()
                    .event(event.event_name())
                    .json_data(&event)
                    .ok()
                    .map(Ok::<_, Infallible>),
                // Client fell behind the buffer; skip the gap
                Err(_) => None,
            }
        });

        let connected = futures::stream::once(async {
            Ok::<_, Infallible>(Event::default().event("ConnectionStatus").data("connected"))
        });

        Sse::new(connected.chain(events)).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("heartbeat"),
        )
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
