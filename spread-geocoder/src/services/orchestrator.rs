//! Enrichment session orchestration
//!
//! Runs one uploaded batch through the pipeline in a background task,
//! updating the in-memory session and broadcasting progress events.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::enrichment_pipeline::{BatchSummary, EnrichmentPipeline, RecordProgress};
use crate::models::{EnrichmentSession, LocationRecord, SessionState};
use spread_common::events::{EventBus, SpreadEvent};

/// In-memory session table shared by handlers and background tasks
pub type SessionStore = Arc<RwLock<HashMap<Uuid, EnrichmentSession>>>;

/// Drop sessions idle for at least `ttl`; returns how many were removed
pub async fn evict_expired_sessions(sessions: &SessionStore, ttl: Duration) -> usize {
    let now = Utc::now();
    let mut sessions = sessions.write().await;
    let before = sessions.len();
    sessions.retain(|session_id, session| {
        let expired = session.is_expired(now, ttl);
        if expired {
            tracing::info!(session_id = %session_id, state = ?session.state, "Evicting idle enrichment session");
        }
        !expired
    });
    before - sessions.len()
}

/// Session lookup / transition errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Enrichment session not found: {0}")]
    NotFound(Uuid),

    #[error("Enrichment session {0} is {1:?}, expected {2:?}")]
    WrongState(Uuid, SessionState, SessionState),
}

/// Drives enrichment sessions
#[derive(Clone)]
pub struct EnrichmentOrchestrator {
    pipeline: Arc<EnrichmentPipeline>,
    sessions: SessionStore,
    event_bus: EventBus,
}

impl EnrichmentOrchestrator {
    pub fn new(pipeline: Arc<EnrichmentPipeline>, sessions: SessionStore, event_bus: EventBus) -> Self {
        Self {
            pipeline,
            sessions,
            event_bus,
        }
    }

    /// Move a LOADED session to PROCESSING and hand back its records
    pub async fn begin(&self, session_id: Uuid) -> Result<Vec<LocationRecord>, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or(SessionError::NotFound(session_id))?;

        if !session.start() {
            return Err(SessionError::WrongState(
                session_id,
                session.state,
                SessionState::Loaded,
            ));
        }

        self.event_bus.emit_lossy(SpreadEvent::EnrichmentStarted {
            session_id,
            total: session.records.len(),
            timestamp: Utc::now(),
        });

        Ok(session.records.clone())
    }

    /// Enrich every record of a session that [`begin`](Self::begin) accepted
    ///
    /// Runs to completion: per-record failures are absorbed by the pipeline.
    pub async fn execute(&self, session_id: Uuid, records: Vec<LocationRecord>) -> BatchSummary {
        let started = Instant::now();
        let sessions = &self.sessions;
        let event_bus = &self.event_bus;

        tracing::info!(session_id = %session_id, total = records.len(), "Starting location enrichment");

        let (enriched, summary) = self
            .pipeline
            .enrich_batch(records, move |progress: RecordProgress| async move {
                let status = progress.status_line();

                if let Some(session) = sessions.write().await.get_mut(&session_id) {
                    session.update_progress(progress.current, &progress.name);
                }

                event_bus.emit_lossy(SpreadEvent::EnrichmentProgress {
                    session_id,
                    current: progress.current,
                    total: progress.total,
                    name: progress.name,
                    status,
                    timestamp: Utc::now(),
                });
            })
            .await;

        if let Some(session) = self.sessions.write().await.get_mut(&session_id) {
            session.complete(enriched);
        } else {
            tracing::warn!(session_id = %session_id, "Session disappeared before completion");
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            session_id = %session_id,
            total = summary.total,
            geocoded = summary.geocoded,
            places_matched = summary.places_matched,
            duration_ms,
            "Location enrichment completed"
        );

        self.event_bus.emit_lossy(SpreadEvent::EnrichmentCompleted {
            session_id,
            total: summary.total,
            geocoded: summary.geocoded,
            places_matched: summary.places_matched,
            duration_ms,
            timestamp: Utc::now(),
        });

        summary
    }
}
