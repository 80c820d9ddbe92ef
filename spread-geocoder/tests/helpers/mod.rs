//! Shared test utilities
//!
//! A scripted [`MapsService`] double that records every query it receives.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use spread_geocoder::services::{
    EnrichmentPipeline, EnrichmentSettings, GeocodeResult, Geometry, LatLng, MapsError,
    MapsService, PlaceCandidate, PlaceDetails,
};

/// Canned answer for one kind of call
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Fail(String),
}

/// Scripted mapping service
///
/// Unscripted calls return empty results.
#[derive(Default)]
pub struct ScriptedMaps {
    geocode: Mutex<HashMap<String, Reply<Vec<GeocodeResult>>>>,
    find_place: Mutex<HashMap<String, Reply<Vec<PlaceCandidate>>>>,
    details: Mutex<HashMap<String, Reply<Option<PlaceDetails>>>>,
    pub geocode_queries: Mutex<Vec<String>>,
    pub find_place_queries: Mutex<Vec<String>>,
    pub details_queries: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedMaps {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_geocode(&self, address: &str, lat: f64, lng: f64) {
        self.geocode.lock().unwrap().insert(
            address.to_string(),
            Reply::Ok(vec![GeocodeResult {
                geometry: Geometry {
                    location: LatLng { lat, lng },
                },
                formatted_address: None,
                place_id: None,
            }]),
        );
    }

    pub fn fail_geocode(&self, address: &str) {
        self.geocode
            .lock()
            .unwrap()
            .insert(address.to_string(), Reply::Fail("OVER_QUERY_LIMIT".to_string()));
    }

    pub fn on_find_place(&self, query: &str, place_id: &str) {
        self.find_place.lock().unwrap().insert(
            query.to_string(),
            Reply::Ok(vec![PlaceCandidate {
                place_id: Some(place_id.to_string()),
                formatted_address: None,
                opening_hours: None,
            }]),
        );
    }

    /// Candidate whose `place_id` is empty
    pub fn on_find_place_without_id(&self, query: &str) {
        self.find_place.lock().unwrap().insert(
            query.to_string(),
            Reply::Ok(vec![PlaceCandidate {
                place_id: Some(String::new()),
                formatted_address: Some("somewhere".to_string()),
                opening_hours: None,
            }]),
        );
    }

    pub fn fail_find_place(&self, query: &str) {
        self.find_place
            .lock()
            .unwrap()
            .insert(query.to_string(), Reply::Fail("REQUEST_DENIED".to_string()));
    }

    pub fn on_details(&self, place_id: &str, details: PlaceDetails) {
        self.details
            .lock()
            .unwrap()
            .insert(place_id.to_string(), Reply::Ok(Some(details)));
    }

    pub fn fail_details(&self, place_id: &str) {
        self.details
            .lock()
            .unwrap()
            .insert(place_id.to_string(), Reply::Fail("UNKNOWN_ERROR".to_string()));
    }

    /// Total remote calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn geocode_count(&self) -> usize {
        self.geocode_queries.lock().unwrap().len()
    }
}

fn answer<T: Clone + Default>(
    script: &Mutex<HashMap<String, Reply<T>>>,
    key: &str,
) -> Result<T, MapsError> {
    match script.lock().unwrap().get(key) {
        Some(Reply::Ok(value)) => Ok(value.clone()),
        Some(Reply::Fail(status)) => Err(MapsError::Api {
            status: status.clone(),
            message: "scripted failure".to_string(),
        }),
        None => Ok(T::default()),
    }
}

#[async_trait]
impl MapsService for ScriptedMaps {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, MapsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.geocode_queries.lock().unwrap().push(address.to_string());
        answer(&self.geocode, address)
    }

    async fn find_place(&self, query: &str) -> Result<Vec<PlaceCandidate>, MapsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.find_place_queries.lock().unwrap().push(query.to_string());
        answer(&self.find_place, query)
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, MapsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.details_queries.lock().unwrap().push(place_id.to_string());
        answer(&self.details, place_id)
    }
}

/// Pipeline over a scripted service with no pause between calls
pub fn test_pipeline(maps: Arc<ScriptedMaps>) -> EnrichmentPipeline {
    paced_pipeline(maps, Duration::ZERO)
}

/// Pipeline pausing `delay` after every call
pub fn paced_pipeline(maps: Arc<ScriptedMaps>, delay: Duration) -> EnrichmentPipeline {
    let settings = EnrichmentSettings {
        api_delay: delay,
        ..EnrichmentSettings::default()
    };
    EnrichmentPipeline::new(maps, &settings)
}

/// Details for the "Acme" store used across tests
pub fn acme_details() -> PlaceDetails {
    serde_json::from_value(serde_json::json!({
        "formatted_address": "123 Main St, Austin, TX 78701, USA",
        "address_components": [
            {"long_name": "123", "short_name": "123", "types": ["street_number"]},
            {"long_name": "Main Street", "short_name": "Main St", "types": ["route"]},
            {"long_name": "Austin", "short_name": "Austin", "types": ["locality", "political"]},
            {"long_name": "Texas", "short_name": "TX", "types": ["administrative_area_level_1", "political"]},
            {"long_name": "78701", "short_name": "78701", "types": ["postal_code"]}
        ],
        "formatted_phone_number": "(512) 555-0100",
        "website": "https://acme.example",
        "opening_hours": {"weekday_text": ["Monday: 9:00 AM – 5:00 PM", "Tuesday: 9:00 AM – 5:00 PM"]}
    }))
    .unwrap()
}

