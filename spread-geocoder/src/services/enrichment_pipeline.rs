//! Per-record location enrichment
//!
//! For each record, strictly in order:
//! 1. Geocode fallback when `lat` or `lng` is empty
//! 2. Find-place on "name in city, state"
//! 3. Place details for the first candidate's `place_id`
//! 4. Merge address/phone/web/hours into the record
//!
//! Every remote call is followed by a fixed pause. Every failure is logged and
//! leaves the affected fields at their prior values; nothing here fails a batch.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::maps_client::{LatLng, MapsError, MapsService, PlaceCandidate, PlaceDetails};
use crate::models::{format_coordinate, LocationRecord};
use spread_common::config::{DEFAULT_API_DELAY_MS, DEFAULT_COUNTRY};

/// Result of one remote-call wrapper
#[derive(Debug)]
pub enum CallOutcome<T> {
    /// The service returned a usable value
    Found(T),
    /// The call succeeded but returned nothing
    Empty,
    /// The call failed; the caller keeps prior values
    Failed(MapsError),
}

/// Fixed pause after every remote call
///
/// A blocking delay, not a token bucket: the loop is sequential so a constant
/// gap keeps the request rate under the service ceiling.
#[derive(Debug, Clone, Copy)]
pub struct CallPacer {
    delay: Duration,
}

impl CallPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Tunables for the pipeline
#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    /// Pause after every remote call
    pub api_delay: Duration,
    /// Country appended to geocoding addresses
    pub country: String,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            api_delay: Duration::from_millis(DEFAULT_API_DELAY_MS),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

/// What happened to one record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordReport {
    /// Coordinates filled in by geocoding
    pub geocoded: bool,
    /// Fields merged from place details
    pub place_matched: bool,
}

/// Position within a batch, reported after each record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordProgress {
    /// 1-based index of the record just finished
    pub current: usize,
    pub total: usize,
    pub name: String,
}

impl RecordProgress {
    /// "Processing i/N: name"
    pub fn status_line(&self) -> String {
        format!("Processing {}/{}: {}", self.current, self.total, self.name)
    }
}

/// Totals for a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub geocoded: usize,
    pub places_matched: usize,
}

impl BatchSummary {
    pub fn record(&mut self, report: RecordReport) {
        self.total += 1;
        if report.geocoded {
            self.geocoded += 1;
        }
        if report.place_matched {
            self.places_matched += 1;
        }
    }
}

/// Free-text geocoding address: address, city, state, postal, country
///
/// Empty parts are skipped; the rest are joined with ", ".
pub fn geocode_address(record: &LocationRecord, country: &str) -> String {
    [
        record.address.as_str(),
        record.city.as_str(),
        record.state.as_str(),
        record.postal.as_str(),
        country,
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(", ")
}

/// Find-place text query
pub fn place_query(record: &LocationRecord) -> String {
    format!("{} in {}, {}", record.name, record.city, record.state)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ExtractedAddress {
    street_number: String,
    route: String,
    city: String,
    state: String,
    postal: String,
}

impl ExtractedAddress {
    fn from_details(details: &PlaceDetails) -> Self {
        let mut extracted = Self::default();
        for component in &details.address_components {
            if component.has_type("street_number") {
                extracted.street_number = component.long_name.clone();
            } else if component.has_type("route") {
                extracted.route = component.long_name.clone();
            } else if component.has_type("locality") {
                extracted.city = component.long_name.clone();
            } else if component.has_type("administrative_area_level_1") {
                extracted.state = component.short_name.clone();
            } else if component.has_type("postal_code") {
                extracted.postal = component.long_name.clone();
            }
        }
        extracted
    }

    fn street_address(&self) -> String {
        [self.street_number.as_str(), self.route.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn overwrite_if_present(slot: &mut String, value: &str) {
    if !value.is_empty() {
        *slot = value.to_string();
    }
}

/// Merge place details into a record
///
/// A non-empty fetched value always replaces the prior field; an empty one
/// never does. `hours2`/`hours3` are never touched.
pub fn merge_place_details(record: &mut LocationRecord, details: &PlaceDetails) {
    let extracted = ExtractedAddress::from_details(details);

    overwrite_if_present(&mut record.address, &extracted.street_address());
    overwrite_if_present(&mut record.city, &extracted.city);
    overwrite_if_present(&mut record.state, &extracted.state);
    overwrite_if_present(&mut record.postal, &extracted.postal);

    if let Some(phone) = &details.formatted_phone_number {
        overwrite_if_present(&mut record.phone, phone);
    }
    if let Some(website) = &details.website {
        overwrite_if_present(&mut record.web, website);
    }

    let weekday_text = details
        .opening_hours
        .as_ref()
        .and_then(|hours| hours.weekday_text.as_ref())
        .filter(|lines| !lines.is_empty());
    if let Some(lines) = weekday_text {
        record.hours1 = lines.join("\n");
    }
}

/// Sequential enrichment over an injected mapping service
pub struct EnrichmentPipeline {
    maps: Arc<dyn MapsService>,
    pacer: CallPacer,
    country: String,
}

impl EnrichmentPipeline {
    pub fn new(maps: Arc<dyn MapsService>, settings: &EnrichmentSettings) -> Self {
        Self {
            maps,
            pacer: CallPacer::new(settings.api_delay),
            country: settings.country.clone(),
        }
    }

    /// Enrich one record
    ///
    /// Never fails: each step falls back to the prior field values.
    pub async fn enrich_record(&self, mut record: LocationRecord) -> (LocationRecord, RecordReport) {
        let mut report = RecordReport::default();
        let location_id = record.id.clone();

        info!("Processing location ID: {} - {}", location_id, record.name);

        if !record.has_coordinates() {
            let address = geocode_address(&record, &self.country);
            if let CallOutcome::Found(location) = self.geocode(&location_id, &address).await {
                record.lat = format_coordinate(location.lat);
                record.lng = format_coordinate(location.lng);
                report.geocoded = true;
                info!(
                    "Geocoded coordinates for ID {}: ({}, {})",
                    location_id, record.lat, record.lng
                );
            }
        }

        let query = place_query(&record);
        match self.find_place(&location_id, &query).await {
            CallOutcome::Found(candidate) => match candidate.place_id.filter(|id| !id.is_empty()) {
                Some(place_id) => match self.place_details(&location_id, &place_id).await {
                    CallOutcome::Found(details) => {
                        merge_place_details(&mut record, &details);
                        report.place_matched = true;
                        info!(
                            "Updated location ID: {} with data from Place Details API.",
                            location_id
                        );
                    }
                    CallOutcome::Empty => warn!(
                        "No details found for place_id {} for location ID: {}.",
                        place_id, location_id
                    ),
                    CallOutcome::Failed(_) => {}
                },
                None => warn!(
                    "No place_id found in Find Place results for location ID: {}.",
                    location_id
                ),
            },
            CallOutcome::Empty => warn!(
                "No place found using Find Place API for location ID: {}.",
                location_id
            ),
            CallOutcome::Failed(_) => {}
        }

        record.finalize();
        (record, report)
    }

    /// Enrich a whole batch in input order
    ///
    /// `on_progress` is awaited after each record, before the next one starts.
    pub async fn enrich_batch<F, Fut>(
        &self,
        records: Vec<LocationRecord>,
        mut on_progress: F,
    ) -> (Vec<LocationRecord>, BatchSummary)
    where
        F: FnMut(RecordProgress) -> Fut,
        Fut: Future<Output = ()>,
    {
        let total = records.len();
        let mut summary = BatchSummary::default();
        let mut enriched = Vec::with_capacity(total);

        for (index, record) in records.into_iter().enumerate() {
            let (updated, report) = self.enrich_record(record).await;
            summary.record(report);
            on_progress(RecordProgress {
                current: index + 1,
                total,
                name: updated.display_name().to_string(),
            })
            .await;
            enriched.push(updated);
        }

        (enriched, summary)
    }

    async fn geocode(&self, location_id: &str, address: &str) -> CallOutcome<LatLng> {
        let result = self.maps.geocode(address).await;
        self.pacer.pause().await;

        match result {
            Ok(results) => match results.into_iter().next() {
                Some(first) => CallOutcome::Found(first.geometry.location),
                None => {
                    warn!(
                        "Geocoding failed for location ID: {}. No results returned.",
                        location_id
                    );
                    CallOutcome::Empty
                }
            },
            Err(e) => {
                if e.is_recognized() {
                    error!("API error during geocoding for location ID {}: {}", location_id, e);
                } else {
                    error!("Unexpected error during geocoding for location ID {}: {}", location_id, e);
                }
                CallOutcome::Failed(e)
            }
        }
    }

    async fn find_place(&self, location_id: &str, query: &str) -> CallOutcome<PlaceCandidate> {
        let result = self.maps.find_place(query).await;
        self.pacer.pause().await;

        match result {
            Ok(candidates) => match candidates.into_iter().next() {
                Some(first) => CallOutcome::Found(first),
                None => CallOutcome::Empty,
            },
            Err(e) => {
                if e.is_recognized() {
                    error!("API error during find_place for '{}': {}", query, e);
                } else {
                    error!("Unexpected error during find_place for '{}': {}", query, e);
                }
                warn!("Keeping existing place fields for location ID: {}", location_id);
                CallOutcome::Failed(e)
            }
        }
    }

    async fn place_details(&self, location_id: &str, place_id: &str) -> CallOutcome<PlaceDetails> {
        let result = self.maps.place_details(place_id).await;
        self.pacer.pause().await;

        match result {
            Ok(Some(details)) => CallOutcome::Found(details),
            Ok(None) => CallOutcome::Empty,
            Err(e) => {
                if e.is_recognized() {
                    error!("API error during place_details for place_id {}: {}", place_id, e);
                } else {
                    error!("Unexpected error during place_details for place_id {}: {}", place_id, e);
                }
                warn!("Keeping existing place fields for location ID: {}", location_id);
                CallOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::maps_client::{AddressComponent, OpeningHours};

    fn component(long_name: &str, short_name: &str, kind: &str) -> AddressComponent {
        AddressComponent {
            long_name: long_name.to_string(),
            short_name: short_name.to_string(),
            types: vec![kind.to_string(), "political".to_string()],
        }
    }

    fn acme() -> LocationRecord {
        LocationRecord {
            id: "1".into(),
            name: "Acme Store".into(),
            address: "1 Old Rd".into(),
            city: "Austin".into(),
            state: "TX".into(),
            postal: "78701".into(),
            phone: "555-0000".into(),
            web: "http://old.test".into(),
            hours1: "old hours".into(),
            hours2: "h2".into(),
            hours3: "h3".into(),
            ..LocationRecord::default()
        }
    }

    #[test]
    fn test_geocode_address_skips_empty_parts() {
        let record = LocationRecord {
            city: "Austin".into(),
            state: "TX".into(),
            ..LocationRecord::default()
        };
        assert_eq!(geocode_address(&record, "USA"), "Austin, TX, USA");
        assert_eq!(
            geocode_address(&acme(), "USA"),
            "1 Old Rd, Austin, TX, 78701, USA"
        );
    }

    #[test]
    fn test_place_query_format() {
        assert_eq!(place_query(&acme()), "Acme Store in Austin, TX");
    }

    #[test]
    fn test_merge_overwrites_with_non_empty_values() {
        let mut record = acme();
        let details = PlaceDetails {
            address_components: vec![
                component("100", "100", "street_number"),
                component("Congress Avenue", "Congress Ave", "route"),
                component("Austin City", "Austin City", "locality"),
                component("Texas", "TX", "administrative_area_level_1"),
                component("78702", "78702", "postal_code"),
            ],
            formatted_phone_number: Some("(512) 555-1234".into()),
            website: Some("https://acme.test".into()),
            opening_hours: Some(OpeningHours {
                open_now: None,
                weekday_text: Some(vec!["Monday: 9-5".into(), "Tuesday: 9-5".into()]),
            }),
            ..PlaceDetails::default()
        };

        merge_place_details(&mut record, &details);

        assert_eq!(record.address, "100 Congress Avenue");
        assert_eq!(record.city, "Austin City");
        assert_eq!(record.state, "TX");
        assert_eq!(record.postal, "78702");
        assert_eq!(record.phone, "(512) 555-1234");
        assert_eq!(record.web, "https://acme.test");
        assert_eq!(record.hours1, "Monday: 9-5\nTuesday: 9-5");
        assert_eq!(record.hours2, "h2");
        assert_eq!(record.hours3, "h3");
    }

    #[test]
    fn test_merge_never_overwrites_with_empty_values() {
        let mut record = acme();
        let details = PlaceDetails {
            address_components: vec![component("", "", "locality")],
            formatted_phone_number: Some(String::new()),
            website: None,
            opening_hours: Some(OpeningHours {
                open_now: Some(true),
                weekday_text: Some(Vec::new()),
            }),
            ..PlaceDetails::default()
        };

        merge_place_details(&mut record, &details);

        assert_eq!(record, acme());
    }

    #[test]
    fn test_street_address_with_route_only() {
        let mut record = acme();
        let details = PlaceDetails {
            address_components: vec![component("Main St", "Main St", "route")],
            ..PlaceDetails::default()
        };
        merge_place_details(&mut record, &details);
        assert_eq!(record.address, "Main St");
    }

    #[test]
    fn test_batch_summary_counts() {
        let mut summary = BatchSummary::default();
        summary.record(RecordReport { geocoded: true, place_matched: false });
        summary.record(RecordReport { geocoded: false, place_matched: true });
        summary.record(RecordReport::default());
        assert_eq!(
            summary,
            BatchSummary { total: 3, geocoded: 1, places_matched: 1 }
        );
    }

    #[test]
    fn test_default_settings() {
        let settings = EnrichmentSettings::default();
        assert_eq!(settings.api_delay, Duration::from_millis(100));
        assert_eq!(settings.country, "USA");
    }
}
