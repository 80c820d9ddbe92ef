//! Server-Sent Events for enrichment progress
//!
//! Streams LocationsLoaded, EnrichmentStarted, EnrichmentProgress and
//! EnrichmentCompleted. `?session_id=` limits the stream to one session.

use crate::AppState;
use axum::{
    extract::{Query, State},
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use uuid::Uuid;

/// GET /events query string
#[derive(Debug, Deserialize)]
pub struct EventStreamQuery {
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

/// GET /events - SSE event stream
pub async fn event_stream(
    State(state): State<AppState>,
    Query(query): Query<EventStreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    spread_common::sse::create_event_sse_stream(
        "spread-geocoder",
        state.event_bus.subscribe(),
        query.session_id,
    )
}
