//! Axum route handlers for the geonote RPC API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use geonote_types::*;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::enrichment::EnrichmentController;
use crate::note_store::NoteStore;

pub struct AppState {
    pub controller: Arc<EnrichmentController>,
    pub store: NoteStore,
    pub start_time: Instant,
    pub location_provider: String,
    pub geocoder_base_url: String,
}

// POST /rpc/draft
pub async fn draft_changed(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DraftChangedRequest>,
) -> (StatusCode, Json<RpcResponse<EnrichmentState>>) {
    // An all-empty draft has nothing worth locating yet.
    if req.title.trim().is_empty() && req.content.trim().is_empty() {
        return (
            StatusCode::OK,
            Json(RpcResponse::ok(state.controller.current_state())),
        );
    }

    state.controller.on_draft_changed();

    (
        StatusCode::OK,
        Json(RpcResponse::ok(state.controller.current_state())),
    )
}

// GET /rpc/enrichment
pub async fn enrichment_state(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<EnrichmentState>>) {
    (
        StatusCode::OK,
        Json(RpcResponse::ok(state.controller.current_state())),
    )
}

// POST /rpc/notes
pub async fn create_note(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateNoteRequest>,
) -> (StatusCode, Json<RpcResponse<Note>>) {
    let location = state.controller.current_snapshot();

    match state.store.create(&req.title, &req.content, location) {
        Ok(note) => {
            // The draft was consumed; the next one starts a fresh attempt.
            state.controller.reset();
            (StatusCode::OK, Json(RpcResponse::ok(note)))
        }
        Err(e) => (StatusCode::BAD_REQUEST, Json(RpcResponse::err(e.message()))),
    }
}

// DELETE /rpc/notes/:id
pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<RpcResponse<DeleteResult>>) {
    let id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RpcResponse::err("Invalid note id")),
            );
        }
    };

    let deleted = state.store.delete(id);
    (StatusCode::OK, Json(RpcResponse::ok(DeleteResult { deleted })))
}

// GET /rpc/notes
pub async fn list_notes(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<Vec<Note>>>) {
    (StatusCode::OK, Json(RpcResponse::ok(state.store.list())))
}

// GET /rpc/status
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<ServiceStatus>>) {
    let status = ServiceStatus {
        running: true,
        uptime_secs: state.start_time.elapsed().as_secs(),
        note_count: state.store.len(),
        enrichment_attempts: state.controller.attempts_started(),
        location_provider: state.location_provider.clone(),
        geocoder_base_url: state.geocoder_base_url.clone(),
    };

    (StatusCode::OK, Json(RpcResponse::ok(status)))
}
