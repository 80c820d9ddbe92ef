//! Business logic services for spread-geocoder

pub mod enrichment_pipeline;
pub mod export;
pub mod google_maps;
pub mod id_assigner;
pub mod ingest;
pub mod maps_client;
pub mod orchestrator;

pub use enrichment_pipeline::{
    geocode_address, merge_place_details, place_query, BatchSummary, CallOutcome, CallPacer,
    EnrichmentPipeline, EnrichmentSettings, RecordProgress, RecordReport,
};
pub use export::{to_pretty_json, DOWNLOAD_FILE_NAME};
pub use google_maps::{GoogleMapsClient, GOOGLE_MAPS_BASE_URL};
pub use id_assigner::{assign_ids, IdAssignment, NumericId};
pub use ingest::{normalize_locations, parse_locations, IngestError};
pub use maps_client::{
    AddressComponent, GeocodeResult, Geometry, LatLng, MapsError, MapsService, OpeningHours,
    PlaceCandidate, PlaceDetails,
};
pub use orchestrator::{
    evict_expired_sessions, EnrichmentOrchestrator, SessionError, SessionStore,
};
