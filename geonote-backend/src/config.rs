//! Service configuration — environment variable names and defaults.

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "GEONOTE_PORT";
    /// Base URL of the reverse-geocoding service.
    pub const NOMINATIM_URL: &str = "GEONOTE_NOMINATIM_URL";
    /// Minimum milliseconds between reverse-geocode requests.
    pub const GEOCODE_MIN_INTERVAL_MS: &str = "GEONOTE_GEOCODE_MIN_INTERVAL_MS";
    /// Helper command that prints a `{latitude, longitude, accuracy}` JSON
    /// fix on stdout (e.g. `termux-location`). Takes precedence over the
    /// fixed-coordinate variables when set.
    pub const LOCATION_COMMAND: &str = "GEONOTE_LOCATION_COMMAND";
    pub const FIXED_LATITUDE: &str = "GEONOTE_FIXED_LATITUDE";
    pub const FIXED_LONGITUDE: &str = "GEONOTE_FIXED_LONGITUDE";
    pub const FIXED_ACCURACY_M: &str = "GEONOTE_FIXED_ACCURACY_M";
    pub const HIGH_ACCURACY: &str = "GEONOTE_HIGH_ACCURACY";
    pub const PROBE_TIMEOUT_MS: &str = "GEONOTE_PROBE_TIMEOUT_MS";
    pub const MAX_CACHED_AGE_MS: &str = "GEONOTE_MAX_CACHED_AGE_MS";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 9104;
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
    pub const GEOCODE_MIN_INTERVAL_MS: u64 = 1000;
    pub const FIXED_ACCURACY_M: f64 = 50.0;
    pub const HIGH_ACCURACY: bool = true;
    pub const PROBE_TIMEOUT_MS: u64 = 10_000;
    pub const MAX_CACHED_AGE_MS: u64 = 60_000;
}

/// Read an env var and parse it, falling back to `default` when unset or
/// unparseable.
pub fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Read a string env var with a default.
pub fn env_string(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
