//! Static asset handlers
//!
//! Embeds and serves CSS/JS files at compile time

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

const SPREAD_UI_CSS: &str = include_str!("../../../static/spread-ui.css");
const ENRICH_JS: &str = include_str!("../../../static/enrich.js");

fn asset(content_type: &'static str, body: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", content_type),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        body,
    )
        .into_response()
}

/// GET /static/spread-ui.css
pub async fn serve_spread_ui_css() -> Response {
    asset("text/css", SPREAD_UI_CSS)
}

/// GET /static/enrich.js
///
/// Upload, start, progress (SSE) and download logic for the root page
pub async fn serve_enrich_js() -> Response {
    asset("application/javascript", ENRICH_JS)
}
