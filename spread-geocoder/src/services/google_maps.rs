//! Google Maps Platform client
//!
//! Geocoding, Find Place and Place Details over the JSON web-service APIs.
//! The client is stateless; one instance is shared across a whole batch.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use super::maps_client::{
    GeocodeResult, MapsError, MapsService, PlaceCandidate, PlaceDetails, FIND_PLACE_FIELDS,
    PLACE_DETAILS_FIELDS,
};

/// Production endpoint root
pub const GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
const USER_AGENT: &str = concat!("spread-geocoder/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct FindPlaceResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    candidates: Vec<PlaceCandidate>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<PlaceDetails>,
}

/// Map a service status to "has results" / "empty" / error
fn check_status(status: &str, error_message: Option<String>) -> Result<bool, MapsError> {
    match status {
        "OK" => Ok(true),
        "ZERO_RESULTS" | "NOT_FOUND" => Ok(false),
        other => Err(MapsError::Api {
            status: other.to_string(),
            message: error_message.unwrap_or_default(),
        }),
    }
}

/// Google Maps web-service client
pub struct GoogleMapsClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for GoogleMapsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleMapsClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GoogleMapsClient {
    pub fn new(api_key: String) -> Result<Self, MapsError> {
        Self::with_base_url(api_key, GOOGLE_MAPS_BASE_URL)
    }

    /// Client against a different endpoint root (proxies, local stubs)
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Result<Self, MapsError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MapsError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, MapsError> {
        let url = format!("{}/{}", self.base_url, path);

        tracing::debug!(url = %url, "Querying Google Maps API");

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MapsError::Http(status.as_u16(), error_text));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| MapsError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MapsService for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, MapsError> {
        let response: GeocodeResponse = self
            .get_json("geocode/json", &[("address", address)])
            .await?;

        if check_status(&response.status, response.error_message)? {
            Ok(response.results)
        } else {
            Ok(Vec::new())
        }
    }

    async fn find_place(&self, query: &str) -> Result<Vec<PlaceCandidate>, MapsError> {
        let fields = FIND_PLACE_FIELDS.join(",");
        let response: FindPlaceResponse = self
            .get_json(
                "place/findplacefromtext/json",
                &[("input", query), ("inputtype", "textquery"), ("fields", fields.as_str())],
            )
            .await?;

        if check_status(&response.status, response.error_message)? {
            Ok(response.candidates)
        } else {
            Ok(Vec::new())
        }
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, MapsError> {
        let fields = PLACE_DETAILS_FIELDS.join(",");
        let response: PlaceDetailsResponse = self
            .get_json(
                "place/details/json",
                &[("place_id", place_id), ("fields", fields.as_str())],
            )
            .await?;

        if check_status(&response.status, response.error_message)? {
            Ok(response.result)
        } else {
            Ok(None)
        }
    }
}
