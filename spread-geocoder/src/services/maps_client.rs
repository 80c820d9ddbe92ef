//! Mapping-service boundary
//!
//! The enrichment pipeline talks to the mapping service only through
//! [`MapsService`]. The production implementation is
//! [`GoogleMapsClient`](super::google_maps::GoogleMapsClient); tests inject
//! scripted doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mapping-service errors
#[derive(Debug, Error)]
pub enum MapsError {
    /// Service answered with a non-OK status (OVER_QUERY_LIMIT, REQUEST_DENIED, ...)
    #[error("API error {status}: {message}")]
    Api { status: String, message: String },

    /// Non-success HTTP status
    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    /// Request could not be sent or the connection failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request exceeded the client timeout
    #[error("Request timed out")]
    Timeout,

    /// Response body was not the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl MapsError {
    /// API, HTTP, transport and timeout failures are the recognized classes.
    /// Anything else is unexpected. Both are handled the same way; only the
    /// log wording differs.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, MapsError::Parse(_))
    }
}

impl From<reqwest::Error> for MapsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MapsError::Timeout
        } else if err.is_decode() {
            MapsError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            MapsError::Http(status.as_u16(), err.to_string())
        } else {
            MapsError::Transport(err.to_string())
        }
    }
}

/// Latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Geocoding result geometry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Geometry {
    pub location: LatLng,
}

/// One geocoding candidate
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
}

/// Weekly opening hours
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    /// One line per weekday, e.g. "Monday: 9:00 AM – 5:00 PM"
    #[serde(default)]
    pub weekday_text: Option<Vec<String>>,
}

/// Find-place candidate
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlaceCandidate {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
}

/// Structured address part
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AddressComponent {
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    pub fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }
}

/// Place details
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
}

/// Fields requested from find-place
pub const FIND_PLACE_FIELDS: [&str; 3] = ["place_id", "formatted_address", "opening_hours"];

/// Fields requested from place details
pub const PLACE_DETAILS_FIELDS: [&str; 5] = [
    "formatted_address",
    "address_component",
    "formatted_phone_number",
    "website",
    "opening_hours",
];

/// Remote mapping service
///
/// All operations are idempotent reads. An empty result is `Ok` with an
/// empty list / `None`, never an error.
#[async_trait]
pub trait MapsService: Send + Sync {
    /// Free-text address → coordinate candidates
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, MapsError>;

    /// Text query → place candidates
    async fn find_place(&self, query: &str) -> Result<Vec<PlaceCandidate>, MapsError>;

    /// Place identifier → details
    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, MapsError>;
}
