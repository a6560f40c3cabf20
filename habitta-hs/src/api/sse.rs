//! Server-Sent Events endpoint

use crate::AppState;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /api/events
///
/// Domain event stream: connection status on connect, then
/// SystemUpdated / FieldsHeldForConfirmation / DecisionRecorded events
/// with heartbeat keep-alives.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    state.events.subscribe_stream("habitta-hs")
}
