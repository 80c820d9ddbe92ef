//! Location enrichment API handlers
//!
//! POST /locations/upload, POST /locations/enrich/{id},
//! GET /locations/status/{id}, GET /locations/download/{id}

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spread_common::events::SpreadEvent;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{EnrichmentSession, SessionProgress, SessionState},
    services::{
        assign_ids, evict_expired_sessions, parse_locations, to_pretty_json, DOWNLOAD_FILE_NAME,
    },
    AppState,
};

/// Largest accepted upload
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// POST /locations/upload query string
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub file_name: Option<String>,
}

/// POST /locations/upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub state: SessionState,
    pub file_name: Option<String>,
    /// Records loaded from the file
    pub loaded: usize,
    /// Records that received a new ID
    pub ids_assigned: usize,
}

/// POST /locations/enrich/{id} response
#[derive(Debug, Serialize)]
pub struct StartEnrichmentResponse {
    pub session_id: Uuid,
    pub state: SessionState,
    pub total: usize,
}

/// GET /locations/status/{id} response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: Uuid,
    pub state: SessionState,
    pub file_name: Option<String>,
    pub progress: SessionProgress,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// POST /locations/upload
///
/// Body is the raw JSON file. Parses, normalizes and assigns IDs; no remote
/// call is made here. Malformed input → 400 and no session.
pub async fn upload_locations(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> ApiResult<Json<UploadResponse>> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ApiError::BadRequest("No file content uploaded".to_string()));
    }

    let mut records = parse_locations(&body).map_err(|e| {
        tracing::warn!(file_name = ?query.file_name, error = %e, "Rejected location upload");
        e
    })?;
    let assignment = assign_ids(&mut records);

    let evicted = evict_expired_sessions(&state.sessions, state.session_ttl).await;
    if evicted > 0 {
        tracing::debug!(evicted, "Dropped idle enrichment sessions");
    }

    let session = EnrichmentSession::new(query.file_name, records);
    let response = UploadResponse {
        session_id: session.session_id,
        state: session.state,
        file_name: session.file_name.clone(),
        loaded: session.records.len(),
        ids_assigned: assignment.assigned,
    };

    state
        .sessions
        .write()
        .await
        .insert(session.session_id, session);

    tracing::info!(
        session_id = %response.session_id,
        loaded = response.loaded,
        ids_assigned = response.ids_assigned,
        "Loaded {} locations from the uploaded file",
        response.loaded
    );

    state.event_bus.emit_lossy(SpreadEvent::LocationsLoaded {
        session_id: response.session_id,
        total: response.loaded,
        ids_assigned: response.ids_assigned,
        timestamp: Utc::now(),
    });

    Ok(Json(response))
}

/// POST /locations/enrich/{session_id}
///
/// Starts background enrichment. 404 for unknown sessions, 409 unless LOADED.
pub async fn start_enrichment(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<StartEnrichmentResponse>)> {
    let orchestrator = state.orchestrator();
    let records = orchestrator.begin(session_id).await?;
    let total = records.len();

    tokio::spawn(async move {
        tracing::info!(session_id = %session_id, "Background enrichment task started");
        orchestrator.execute(session_id, records).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(StartEnrichmentResponse {
            session_id,
            state: SessionState::Processing,
            total,
        }),
    ))
}

/// GET /locations/status/{session_id}
pub async fn get_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionStatusResponse>> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&session_id).ok_or_else(|| {
        ApiError::NotFound(format!("Enrichment session not found: {}", session_id))
    })?;

    tracing::debug!(session_id = %session_id, state = ?session.state, "Status query");

    Ok(Json(SessionStatusResponse {
        session_id,
        state: session.state,
        file_name: session.file_name.clone(),
        progress: session.progress.clone(),
        created_at: session.created_at,
        started_at: session.started_at,
        ended_at: session.ended_at,
    }))
}

/// GET /locations/download/{session_id}
///
/// Pretty-printed JSON attachment, only once the session is COMPLETED.
pub async fn download_locations(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Response> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&session_id).ok_or_else(|| {
        ApiError::NotFound(format!("Enrichment session not found: {}", session_id))
    })?;

    if !session.is_completed() {
        return Err(ApiError::Conflict(format!(
            "Enrichment session {} is not complete ({:?})",
            session_id, session.state
        )));
    }

    let body = to_pretty_json(&session.enriched)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize locations: {}", e)))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
            ),
        ],
        body,
    )
        .into_response())
}

/// Build location routes
pub fn location_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/locations/upload",
            post(upload_locations).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/locations/enrich/:session_id", post(start_enrichment))
        .route("/locations/status/:session_id", get(get_session_status))
        .route("/locations/download/:session_id", get(download_locations))
}
