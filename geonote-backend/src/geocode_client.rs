//! Typed HTTP client for the Nominatim reverse-geocoding API.
//!
//! One attempt per lookup, no retry loop. Any transport, status, or decode
//! problem falls back to the coordinate string, so callers never see an
//! error from this module.

use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const USER_AGENT: &str = concat!("geonote-backend/", env!("CARGO_PKG_VERSION"));

pub struct GeocodeClient {
    base_url: String,
    client: reqwest::Client,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

/// Subset of the Nominatim `/reverse` response we care about.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
}

impl GeocodeClient {
    pub fn new(base_url: &str, min_interval_ms: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            min_interval: Duration::from_millis(min_interval_ms),
            last_request: Mutex::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve coordinates to a human-readable address.
    ///
    /// Never fails outward: on any failure the deterministic coordinate
    /// fallback is returned instead.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> String {
        self.throttle().await;

        match self.try_reverse(latitude, longitude).await {
            Ok(address) => address,
            Err(e) => {
                log::warn!("Reverse geocode failed, using coordinate fallback: {}", e);
                fallback_address(latitude, longitude)
            }
        }
    }

    async fn try_reverse(&self, latitude: f64, longitude: f64) -> Result<String, String> {
        let resp = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("format", "json".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("zoom", "18".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }

        let data: ReverseResponse = resp
            .json()
            .await
            .map_err(|e| format!("Parse response: {}", e))?;

        match data.display_name {
            Some(name) if !name.trim().is_empty() => Ok(name),
            _ => Err("Response missing display_name".to_string()),
        }
    }

    /// Enforce the minimum interval between requests (Nominatim public-use
    /// policy). The lock is held across the sleep so concurrent callers
    /// queue instead of bursting.
    async fn throttle(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let next_allowed = prev + self.min_interval;
            let now = Instant::now();
            if now < next_allowed {
                tokio::time::sleep(next_allowed - now).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Deterministic local substitute for an unreachable geocoder.
pub fn fallback_address(latitude: f64, longitude: f64) -> String {
    format!("{:.6}, {:.6}", latitude, longitude)
}
