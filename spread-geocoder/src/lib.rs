//! spread-geocoder library interface
//!
//! Store-location enrichment: upload a JSON list of locations, fill in
//! coordinates and place metadata from Google Maps, download the result.

pub mod api;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use spread_common::config::DEFAULT_SESSION_TTL_SECS;
use spread_common::events::EventBus;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::services::{EnrichmentOrchestrator, EnrichmentPipeline, SessionStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Uploaded batches, keyed by session ID
    pub sessions: SessionStore,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Shared enrichment pipeline (wraps the injected Maps client)
    pub pipeline: Arc<EnrichmentPipeline>,
    /// Idle LOADED/COMPLETED sessions older than this are dropped on upload
    pub session_ttl: Duration,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: EnrichmentPipeline, event_bus: EventBus) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            event_bus,
            pipeline: Arc::new(pipeline),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            startup_time: Utc::now(),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn orchestrator(&self) -> EnrichmentOrchestrator {
        EnrichmentOrchestrator::new(
            Arc::clone(&self.pipeline),
            Arc::clone(&self.sessions),
            self.event_bus.clone(),
        )
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        // UI routes (HTML pages)
        .merge(api::ui_routes())
        // API routes
        .merge(api::location_routes())
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
