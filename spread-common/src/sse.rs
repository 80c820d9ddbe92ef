//! Server-Sent Events (SSE) utilities

use crate::events::SpreadEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Convert an event into an SSE frame (`event:` = event type, `data:` = JSON)
pub fn to_sse_event(event: &SpreadEvent) -> Option<Event> {
    let event_type = event.event_type();
    match serde_json::to_string(event) {
        Ok(event_json) => Some(Event::default().event(event_type).data(event_json)),
        Err(e) => {
            warn!("SSE: Failed to serialize event {}: {}", event_type, e);
            None
        }
    }
}

/// Forward bus events to an SSE client, with a heartbeat every 15 seconds
///
/// A `session_filter` restricts the stream to one enrichment session.
/// The stream opens with a `ConnectionStatus: connected` frame so the page can
/// show its connection badge immediately.
pub fn create_event_sse_stream(
    service_name: &'static str,
    mut rx: broadcast::Receiver<SpreadEvent>,
    session_filter: Option<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} events", service_name);

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            tokio::select! {
                _ = tokio::time::sleep(HEARTBEAT_INTERVAL) => {
                    debug!("SSE: Sending heartbeat");
                    yield Ok(Event::default().comment("heartbeat"));
                }

                received = rx.recv() => {
                    match received {
                        Ok(event) => {
                            let wanted = session_filter.map_or(true, |id| id == event.session_id());
                            if wanted {
                                if let Some(frame) = to_sse_event(&event) {
                                    debug!("SSE: Broadcasting event: {}", event.event_type());
                                    yield Ok(frame);
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("SSE: {} client lagged, skipped {} events", service_name, skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            info!("SSE: {} event bus closed", service_name);
                            break;
                        }
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}
