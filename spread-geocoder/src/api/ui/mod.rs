//! UI Routes - HTML page and static assets for the enrichment web form

use crate::AppState;
use axum::{routing::get, Router};

mod root;
mod static_assets;

use root::root_page;
use static_assets::{serve_enrich_js, serve_spread_ui_css};

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_page))
        .route("/static/spread-ui.css", get(serve_spread_ui_css))
        .route("/static/enrich.js", get(serve_enrich_js))
}
