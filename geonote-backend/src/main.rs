//! GeoNote Module Service — location-enriched note authoring backend.
//!
//! Every draft change the UI reports starts a location-enrichment attempt
//! (device probe, then reverse geocoding); creating a note freezes the
//! latest resolved snapshot into it. Notes live for the process only.
//!
//! Default: http://127.0.0.1:9104/

mod config;
mod enrichment;
mod geocode_client;
mod location_probe;
mod note_store;
mod routes;

use std::sync::Arc;
use std::time::Instant;

use enrichment::EnrichmentController;
use geocode_client::GeocodeClient;
use location_probe::{
    CommandLocationProvider, FixedLocationProvider, LocationProbe, LocationProvider, ProbeOptions,
};
use note_store::NoteStore;
use routes::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let port: u16 = config::env_parsed(config::env_vars::PORT, config::defaults::PORT);
    let nominatim_url = config::env_string(
        config::env_vars::NOMINATIM_URL,
        config::defaults::NOMINATIM_URL,
    );
    let min_interval_ms = config::env_parsed(
        config::env_vars::GEOCODE_MIN_INTERVAL_MS,
        config::defaults::GEOCODE_MIN_INTERVAL_MS,
    );

    let options = ProbeOptions {
        enable_high_accuracy: config::env_parsed(
            config::env_vars::HIGH_ACCURACY,
            config::defaults::HIGH_ACCURACY,
        ),
        timeout_ms: config::env_parsed(
            config::env_vars::PROBE_TIMEOUT_MS,
            config::defaults::PROBE_TIMEOUT_MS,
        ),
        max_cached_age_ms: config::env_parsed(
            config::env_vars::MAX_CACHED_AGE_MS,
            config::defaults::MAX_CACHED_AGE_MS,
        ),
    };

    let (provider, provider_label) = select_provider();
    if provider.is_none() {
        log::warn!(
            "No location provider configured ({} or {}/{}); enrichment will report unavailable",
            config::env_vars::LOCATION_COMMAND,
            config::env_vars::FIXED_LATITUDE,
            config::env_vars::FIXED_LONGITUDE,
        );
    }

    let probe = Arc::new(LocationProbe::new(provider));
    let geocoder = Arc::new(GeocodeClient::new(&nominatim_url, min_interval_ms));
    log::info!("Reverse geocoding via {}", geocoder.base_url());

    let controller = Arc::new(EnrichmentController::new(probe, geocoder, options));

    let state = Arc::new(AppState {
        controller,
        store: NoteStore::new(),
        start_time: Instant::now(),
        location_provider: provider_label,
        geocoder_base_url: nominatim_url,
    });

    let cors = tower_http::cors::CorsLayer::permissive();

    let app = axum::Router::new()
        .route("/rpc/draft", axum::routing::post(routes::draft_changed))
        .route("/rpc/enrichment", axum::routing::get(routes::enrichment_state))
        .route(
            "/rpc/notes",
            axum::routing::post(routes::create_note).get(routes::list_notes),
        )
        .route("/rpc/notes/:id", axum::routing::delete(routes::delete_note))
        .route("/rpc/status", axum::routing::get(routes::status))
        .with_state(state)
        .layer(cors);

    let addr = format!("127.0.0.1:{}", port);
    log::info!("GeoNote Module Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}

/// Pick the location provider from the environment: a helper command if
/// configured, else fixed coordinates, else none.
fn select_provider() -> (Option<Arc<dyn LocationProvider>>, String) {
    if let Ok(command) = std::env::var(config::env_vars::LOCATION_COMMAND) {
        if !command.trim().is_empty() {
            log::info!("Using location command provider: {}", command);
            return (
                Some(Arc::new(CommandLocationProvider::new(command))),
                "command".to_string(),
            );
        }
    }

    let latitude: Option<f64> = std::env::var(config::env_vars::FIXED_LATITUDE)
        .ok()
        .and_then(|s| s.parse().ok());
    let longitude: Option<f64> = std::env::var(config::env_vars::FIXED_LONGITUDE)
        .ok()
        .and_then(|s| s.parse().ok());

    if let (Some(latitude), Some(longitude)) = (latitude, longitude) {
        let accuracy = config::env_parsed(
            config::env_vars::FIXED_ACCURACY_M,
            config::defaults::FIXED_ACCURACY_M,
        );
        log::info!(
            "Using fixed location provider at {:.6}, {:.6}",
            latitude,
            longitude
        );
        return (
            Some(Arc::new(FixedLocationProvider::new(
                latitude, longitude, accuracy,
            ))),
            "fixed".to_string(),
        );
    }

    (None, "none".to_string())
}
