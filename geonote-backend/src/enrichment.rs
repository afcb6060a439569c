//! Enrichment orchestration — probe, resolve, latest-wins state.
//!
//! Each draft change starts a fresh attempt under a new generation id.
//! Attempt tasks may overlap freely; every state transition is guarded by
//! a generation check under the state lock, so a slow superseded attempt
//! can never clobber a newer result. Superseding never aborts the older
//! attempt at the transport level, it only discards its completion.

use geonote_types::{EnrichmentState, LocationSnapshot};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use crate::geocode_client::GeocodeClient;
use crate::location_probe::{LocationProbe, ProbeOptions};

pub struct EnrichmentController {
    probe: Arc<LocationProbe>,
    geocoder: Arc<GeocodeClient>,
    options: ProbeOptions,
    state: Mutex<EnrichmentState>,
    generation: AtomicU64,
    attempts: AtomicU64,
}

impl EnrichmentController {
    pub fn new(probe: Arc<LocationProbe>, geocoder: Arc<GeocodeClient>, options: ProbeOptions) -> Self {
        Self {
            probe,
            geocoder,
            options,
            state: Mutex::new(EnrichmentState::Idle),
            generation: AtomicU64::new(0),
            attempts: AtomicU64::new(0),
        }
    }

    /// Start a new enrichment attempt, superseding any in-flight one.
    ///
    /// The transition to `Probing` happens before this returns; the rest
    /// of the attempt runs on the spawned task.
    pub fn on_draft_changed(self: &Arc<Self>) -> JoinHandle<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.attempts.fetch_add(1, Ordering::Relaxed);
        self.apply_if_current(generation, EnrichmentState::Probing);

        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.run_attempt(generation).await })
    }

    async fn run_attempt(&self, generation: u64) {
        let position = match self.probe.acquire(&self.options).await {
            Ok(position) => position,
            Err(reason) => {
                if self.apply_if_current(generation, EnrichmentState::Failed { reason }) {
                    log::info!("Enrichment failed: {}", reason.as_str());
                }
                return;
            }
        };

        if !self.apply_if_current(generation, EnrichmentState::Resolving) {
            return; // superseded while probing
        }

        let address = self
            .geocoder
            .reverse(position.latitude, position.longitude)
            .await;

        let snapshot = LocationSnapshot {
            latitude: position.latitude,
            longitude: position.longitude,
            accuracy_meters: position.accuracy_meters,
            address,
        };
        self.apply_if_current(generation, EnrichmentState::Ready { snapshot });
    }

    /// Apply a transition iff `generation` is still the latest.
    ///
    /// The check and the write happen under the state lock, so no two
    /// completions from different generations can both apply.
    fn apply_if_current(&self, generation: u64, next: EnrichmentState) -> bool {
        let mut state = self.state.lock().unwrap();
        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("Discarding stale enrichment result (generation {})", generation);
            return false;
        }
        *state = next;
        true
    }

    /// Clone of the current state, for display.
    pub fn current_state(&self) -> EnrichmentState {
        self.state.lock().unwrap().clone()
    }

    /// The snapshot to freeze into a note, if enrichment is `Ready`.
    /// Non-blocking.
    pub fn current_snapshot(&self) -> Option<LocationSnapshot> {
        match &*self.state.lock().unwrap() {
            EnrichmentState::Ready { snapshot } => Some(snapshot.clone()),
            _ => None,
        }
    }

    /// Return to `Idle` and invalidate any in-flight attempt. Its eventual
    /// completion is discarded by the generation guard.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        self.generation.fetch_add(1, Ordering::SeqCst);
        *state = EnrichmentState::Idle;
    }

    pub fn attempts_started(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}
