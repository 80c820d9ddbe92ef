//! Root page handler - upload / progress / download form

use axum::response::{Html, IntoResponse};

/// GET /
pub async fn root_page() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = env!("GIT_HASH");
    let build_profile = env!("BUILD_PROFILE");
    let build_timestamp = env!("BUILD_TIMESTAMP");

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Shotgun Spread Geocoder</title>
    <link rel="stylesheet" href="/static/spread-ui.css">
</head>
<body>
    <header>
        <div class="header-content">
            <div>
                <h1>Shotgun Spread Geocoder</h1>
                <p class="subtitle">Upload a JSON file with store location data, and the app will
                retrieve each store's address details, including latitude, longitude, website,
                phone and opening hours. It then produces a downloadable
                updated_locations.json file with the enhanced data.</p>
            </div>
            <div class="header-right">
                <div>spread-geocoder v{version}</div>
                <div>{git_hash} ({build_profile})</div>
                <div>{build_timestamp}</div>
            </div>
        </div>
    </header>
    <div class="content">
        <div class="panel">
            <label for="file-input">Choose a JSON file</label><br>
            <input type="file" id="file-input" accept=".json,application/json">
            <div id="upload-message" class="message hidden"></div>
            <button id="start-button" class="button" disabled>Update Locations</button>
        </div>
        <div id="progress-panel" class="panel hidden">
            <div class="progress-track"><div id="progress-fill" class="progress-fill"></div></div>
            <div id="status-text"></div>
            <div id="done-message" class="message hidden"></div>
            <a id="download-link" class="button hidden" download="updated_locations.json">Download Updated Locations</a>
        </div>
    </div>
    <script src="/static/enrich.js"></script>
</body>
</html>
"#,
        git_hash = git_hash.get(..8).unwrap_or(git_hash),
    ))
}
