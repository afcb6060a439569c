//! Shared types for the geonote module service and its RPC clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =====================================================
// RPC Request Types
// =====================================================

/// Notify the service that the authored draft changed
#[derive(Debug, Serialize, Deserialize)]
pub struct DraftChangedRequest {
    pub title: String,
    pub content: String,
}

/// Create a note from the current draft
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
}

// =====================================================
// RPC Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> RpcResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Outcome of a note deletion (idempotent — `deleted` is false for absent ids)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResult {
    pub deleted: bool,
}

/// Service health status
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub note_count: usize,
    pub enrichment_attempts: u64,
    pub location_provider: String,
    pub geocoder_base_url: String,
}

// =====================================================
// Domain Types
// =====================================================

/// An immutable capture of where the user was when a draft was enriched.
///
/// `address` is the reverse-geocoded display name, or the coordinate
/// fallback string when the geocoding service could not be reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
    pub address: String,
}

/// Why a location probe failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeFailure {
    PermissionDenied,
    Unavailable,
    Timeout,
}

impl ProbeFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeFailure::PermissionDenied => "permission_denied",
            ProbeFailure::Unavailable => "unavailable",
            ProbeFailure::Timeout => "timeout",
        }
    }
}

/// Where an enrichment attempt currently stands.
///
/// Exactly one value exists per controller; `Failed` never blocks note
/// creation, it only means the note will carry no location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EnrichmentState {
    Idle,
    Probing,
    Resolving,
    Ready { snapshot: LocationSnapshot },
    Failed { reason: ProbeFailure },
}

/// A stored note. Immutable after creation except for store membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationSnapshot>,
    pub created_at: DateTime<Utc>,
}

/// Why a note could not be created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    EmptyTitle,
    EmptyContent,
}

impl ValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::EmptyTitle => "Title must not be empty",
            ValidationError::EmptyContent => "Content must not be empty",
        }
    }
}
