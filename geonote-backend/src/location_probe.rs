//! Location acquisition — the provider seam and the caching probe.
//!
//! `LocationProvider` abstracts whatever capability the host exposes for
//! obtaining coordinates. `LocationProbe` wraps a provider with the
//! cached-fix window and the acquisition timeout, and maps every failure
//! to one of the three `ProbeFailure` kinds.

use async_trait::async_trait;
use geonote_types::ProbeFailure;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A raw coordinate fix from the host's location capability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
}

/// Options for a single acquisition.
#[derive(Debug, Clone, Copy)]
pub struct ProbeOptions {
    pub enable_high_accuracy: bool,
    /// No fix within this window fails the acquisition with `Timeout`.
    pub timeout_ms: u64,
    /// A cached fix no older than this may be returned instead of a fresh one.
    pub max_cached_age_ms: u64,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: 10_000,
            max_cached_age_ms: 60_000,
        }
    }
}

/// Source of coordinate fixes. Implementations must not retry internally;
/// the probe owns timing.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self, high_accuracy: bool) -> Result<Position, ProbeFailure>;
}

/// Fixed coordinates from configuration. The development and test fixture.
pub struct FixedLocationProvider {
    position: Position,
}

impl FixedLocationProvider {
    pub fn new(latitude: f64, longitude: f64, accuracy_meters: f64) -> Self {
        Self {
            position: Position {
                latitude,
                longitude,
                accuracy_meters,
            },
        }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_position(&self, _high_accuracy: bool) -> Result<Position, ProbeFailure> {
        Ok(self.position)
    }
}

/// Runs a helper command (e.g. `termux-location`) and parses the JSON fix
/// it prints on stdout.
pub struct CommandLocationProvider {
    command: String,
}

/// Expected stdout shape of the helper command.
#[derive(Debug, Deserialize)]
struct CommandFix {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    accuracy: f64,
}

impl CommandLocationProvider {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl LocationProvider for CommandLocationProvider {
    async fn current_position(&self, _high_accuracy: bool) -> Result<Position, ProbeFailure> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or(ProbeFailure::Unavailable)?;

        let output = tokio::process::Command::new(program)
            .args(parts)
            .output()
            .await
            .map_err(|e| {
                log::warn!("Location command failed to spawn: {}", e);
                ProbeFailure::Unavailable
            })?;

        // Helper commands report denied location access via a non-zero exit.
        if !output.status.success() {
            log::warn!("Location command exited with {}", output.status);
            return Err(ProbeFailure::PermissionDenied);
        }

        let fix: CommandFix = serde_json::from_slice(&output.stdout).map_err(|e| {
            log::warn!("Location command output unparseable: {}", e);
            ProbeFailure::Unavailable
        })?;

        Ok(Position {
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy_meters: fix.accuracy,
        })
    }
}

struct CachedFix {
    position: Position,
    acquired_at: Instant,
}

/// Wraps the configured provider with the cached-fix window and the
/// acquisition timeout. At most one outstanding provider request per call.
pub struct LocationProbe {
    provider: Option<Arc<dyn LocationProvider>>,
    cache: Mutex<Option<CachedFix>>,
}

impl LocationProbe {
    pub fn new(provider: Option<Arc<dyn LocationProvider>>) -> Self {
        Self {
            provider,
            cache: Mutex::new(None),
        }
    }

    /// Acquire a coordinate fix.
    ///
    /// Returns `Unavailable` when no provider is configured, `Timeout`
    /// when no fix arrives within `timeout_ms`, and passes provider
    /// failures through unchanged.
    pub async fn acquire(&self, options: &ProbeOptions) -> Result<Position, ProbeFailure> {
        let provider = self.provider.as_ref().ok_or(ProbeFailure::Unavailable)?;

        if let Some(position) = self.cached_fix(options.max_cached_age_ms) {
            return Ok(position);
        }

        let request = provider.current_position(options.enable_high_accuracy);
        let position = match tokio::time::timeout(Duration::from_millis(options.timeout_ms), request).await
        {
            Ok(result) => result?,
            Err(_) => return Err(ProbeFailure::Timeout),
        };

        *self.cache.lock().unwrap() = Some(CachedFix {
            position,
            acquired_at: Instant::now(),
        });

        Ok(position)
    }

    fn cached_fix(&self, max_age_ms: u64) -> Option<Position> {
        if max_age_ms == 0 {
            return None;
        }
        self.cache
            .lock()
            .unwrap()
            .as_ref()
            .filter(|fix| fix.acquired_at.elapsed() <= Duration::from_millis(max_age_ms))
            .map(|fix| fix.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        position: Position,
    }

    impl CountingProvider {
        fn new(position: Position) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                position,
            }
        }
    }

    #[async_trait]
    impl LocationProvider for CountingProvider {
        async fn current_position(&self, _high_accuracy: bool) -> Result<Position, ProbeFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.position)
        }
    }

    struct PendingProvider;

    #[async_trait]
    impl LocationProvider for PendingProvider {
        async fn current_position(&self, _high_accuracy: bool) -> Result<Position, ProbeFailure> {
            std::future::pending().await
        }
    }

    fn seoul() -> Position {
        Position {
            latitude: 37.5665,
            longitude: 126.9780,
            accuracy_meters: 12.0,
        }
    }

    #[tokio::test]
    async fn test_probe_without_provider_is_unavailable() {
        let probe = LocationProbe::new(None);
        let result = probe.acquire(&ProbeOptions::default()).await;
        assert_eq!(result, Err(ProbeFailure::Unavailable));
    }

    #[tokio::test]
    async fn test_probe_returns_cached_fix_within_age_window() {
        let provider = Arc::new(CountingProvider::new(seoul()));
        let probe = LocationProbe::new(Some(provider.clone()));
        let options = ProbeOptions::default();

        let first = probe.acquire(&options).await.expect("Failed to acquire");
        let second = probe.acquire(&options).await.expect("Failed to acquire");

        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_probe_with_zero_cache_age_queries_again() {
        let provider = Arc::new(CountingProvider::new(seoul()));
        let probe = LocationProbe::new(Some(provider.clone()));
        let options = ProbeOptions {
            max_cached_age_ms: 0,
            ..ProbeOptions::default()
        };

        probe.acquire(&options).await.expect("Failed to acquire");
        probe.acquire(&options).await.expect("Failed to acquire");

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_probe_times_out() {
        let probe = LocationProbe::new(Some(Arc::new(PendingProvider)));
        let options = ProbeOptions {
            timeout_ms: 20,
            ..ProbeOptions::default()
        };

        let result = probe.acquire(&options).await;
        assert_eq!(result, Err(ProbeFailure::Timeout));
    }

    #[tokio::test]
    async fn test_command_provider_parses_fix() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fix.sh");
        std::fs::write(
            &script,
            "echo '{\"latitude\": 37.5665, \"longitude\": 126.978, \"accuracy\": 8.5}'\n",
        )
        .expect("Failed to write script");

        let provider = CommandLocationProvider::new(format!("sh {}", script.display()));
        let position = provider
            .current_position(true)
            .await
            .expect("Failed to read fix");

        assert_eq!(position.latitude, 37.5665);
        assert_eq!(position.longitude, 126.978);
        assert_eq!(position.accuracy_meters, 8.5);
    }

    #[tokio::test]
    async fn test_command_provider_nonzero_exit_is_permission_denied() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("deny.sh");
        std::fs::write(&script, "exit 1\n").expect("Failed to write script");

        let provider = CommandLocationProvider::new(format!("sh {}", script.display()));
        let result = provider.current_position(true).await;
        assert_eq!(result, Err(ProbeFailure::PermissionDenied));
    }

    #[tokio::test]
    async fn test_command_provider_missing_command_is_unavailable() {
        let provider = CommandLocationProvider::new("geonote-no-such-command");
        let result = provider.current_position(true).await;
        assert_eq!(result, Err(ProbeFailure::Unavailable));
    }

    #[tokio::test]
    async fn test_command_provider_garbage_output_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("garbage.sh");
        std::fs::write(&script, "echo 'not json'\n").expect("Failed to write script");

        let provider = CommandLocationProvider::new(format!("sh {}", script.display()));
        let result = provider.current_position(true).await;
        assert_eq!(result, Err(ProbeFailure::Unavailable));
    }
}
