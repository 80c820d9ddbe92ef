//! HTTP API handlers for spread-geocoder

pub mod health;
pub mod locations;
pub mod sse;
pub mod ui;

pub use health::health_routes;
pub use locations::location_routes;
pub use sse::event_stream;
pub use ui::ui_routes;
