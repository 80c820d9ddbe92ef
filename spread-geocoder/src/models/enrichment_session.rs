//! Enrichment session state machine
//!
//! A session holds one uploaded batch: LOADED → PROCESSING → COMPLETED.
//! Sessions live only in memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::LocationRecord;

/// Enrichment session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    /// File parsed and IDs assigned; waiting for the user to start
    Loaded,
    /// Records are being enriched
    Processing,
    /// Output ready for download
    Completed,
}

/// Progress tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionProgress {
    /// Records processed so far
    pub current: usize,

    /// Records in the batch
    pub total: usize,

    /// Percentage complete (0.0 - 100.0)
    pub percentage: f64,

    /// Status line, e.g. "Processing 3/10: Acme Store"
    pub current_operation: String,

    /// Elapsed time since processing started (seconds)
    pub elapsed_seconds: u64,

    /// Estimated remaining time (seconds), None if unknown
    pub estimated_remaining_seconds: Option<u64>,
}

impl Default for SessionProgress {
    fn default() -> Self {
        Self {
            current: 0,
            total: 0,
            percentage: 0.0,
            current_operation: String::from("Awaiting start"),
            elapsed_seconds: 0,
            estimated_remaining_seconds: None,
        }
    }
}

/// One uploaded batch of locations
#[derive(Debug, Clone)]
pub struct EnrichmentSession {
    pub session_id: Uuid,
    pub state: SessionState,
    /// Name of the uploaded file, if the browser sent one
    pub file_name: Option<String>,
    /// Normalized, ID-assigned input records
    pub records: Vec<LocationRecord>,
    /// Enriched records (filled once COMPLETED)
    pub enriched: Vec<LocationRecord>,
    pub progress: SessionProgress,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl EnrichmentSession {
    /// Create a LOADED session for a normalized batch
    pub fn new(file_name: Option<String>, records: Vec<LocationRecord>) -> Self {
        let progress = SessionProgress {
            total: records.len(),
            ..SessionProgress::default()
        };
        Self {
            session_id: Uuid::new_v4(),
            state: SessionState::Loaded,
            file_name,
            records,
            enriched: Vec::new(),
            progress,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    /// LOADED → PROCESSING
    ///
    /// Returns false (and changes nothing) from any other state.
    pub fn start(&mut self) -> bool {
        if self.state != SessionState::Loaded {
            return false;
        }
        self.state = SessionState::Processing;
        self.started_at = Some(Utc::now());
        self.progress.current_operation = "Starting".to_string();
        true
    }

    /// Record that the `current`-th record (1-based) finished
    pub fn update_progress(&mut self, current: usize, name: &str) {
        let total = self.progress.total;
        self.progress.current = current;
        self.progress.percentage = if total > 0 {
            (current as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        self.progress.current_operation = format!("Processing {}/{}: {}", current, total, name);

        let elapsed = self
            .started_at
            .map(|t| (Utc::now() - t).num_seconds().max(0) as u64)
            .unwrap_or(0);
        self.progress.elapsed_seconds = elapsed;

        if current > 0 && total > current {
            let rate = elapsed as f64 / current as f64;
            self.progress.estimated_remaining_seconds = Some(((total - current) as f64 * rate) as u64);
        } else {
            self.progress.estimated_remaining_seconds = None;
        }
    }

    /// PROCESSING → COMPLETED, storing the output
    pub fn complete(&mut self, enriched: Vec<LocationRecord>) {
        self.enriched = enriched;
        self.state = SessionState::Completed;
        self.ended_at = Some(Utc::now());
        self.progress.current_operation = "Processing complete.".to_string();
        self.progress.estimated_remaining_seconds = None;
        if self.progress.total == 0 {
            self.progress.percentage = 100.0;
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Idle for at least `ttl` as of `now`
    ///
    /// A PROCESSING session is never expired: its background task still
    /// writes to it.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        if self.state == SessionState::Processing {
            return false;
        }
        let last_activity = self.ended_at.unwrap_or(self.created_at);
        (now - last_activity)
            .to_std()
            .map_or(false, |idle| idle >= ttl)
    }
}
