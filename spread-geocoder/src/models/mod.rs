//! Data models for spread-geocoder
//!
//! - Store-location record with fixed 18-field shape
//! - In-memory enrichment session state

pub mod enrichment_session;
pub mod location;

pub use enrichment_session::{EnrichmentSession, SessionProgress, SessionState};
pub use location::{format_coordinate, LocationRecord, FEATURED_DEFAULT, FIELD_NAMES};
