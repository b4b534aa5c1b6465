//! HTTP handlers for the wedding speech API
//!
//! - POST /generate-speech  — draft a speech and store it
//! - POST /send-speech      — email a speech and record the delivery
//! - GET  /speech/:id       — stored speech

use crate::api::ApiError;
use crate::artifact::{ArtifactKind, DraftRequest};
use crate::notifier::DeliveryMetadata;
use crate::orchestrator::Orchestrator;
use crate::speeches::types::*;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Shared state for speech handlers
#[derive(Clone)]
pub struct SpeechesState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Create the speeches router
pub fn speeches_router(state: SpeechesState) -> Router {
    Router::new()
        .route("/generate-speech", post(generate_speech))
        .route("/send-speech", post(send_speech))
        .route("/speech/:id", get(get_speech))
        .with_state(state)
}

/// POST /generate-speech
async fn generate_speech(
    State(state): State<SpeechesState>,
    payload: Result<Json<SpeechRequest>, JsonRejection>,
) -> Result<Json<SpeechResponse>, ApiError> {
    let Json(request) = payload?;
    let outcome = state
        .orchestrator
        .generate(DraftRequest::Speech(request))
        .await?;

    Ok(Json(SpeechResponse {
        speech_id: outcome.persistence.id(),
        speech: outcome.value,
    }))
}

/// POST /send-speech
async fn send_speech(
    State(state): State<SpeechesState>,
    payload: Result<Json<SendSpeechRequest>, JsonRejection>,
) -> Result<Json<SendSpeechResponse>, ApiError> {
    let Json(request) = payload?;
    let outcome = state
        .orchestrator
        .send(
            &request.speech,
            &request.email,
            request.speech_id,
            &DeliveryMetadata::speech(),
        )
        .await?;

    if let Some(matched_by) = outcome.persistence.matched_by() {
        tracing::debug!(?matched_by, "Speech delivery recorded");
    }
    Ok(Json(SendSpeechResponse {
        status: "success".to_string(),
        message: format!("Speech sent to {}", request.email),
    }))
}

/// GET /speech/:id
async fn get_speech(
    State(state): State<SpeechesState>,
    Path(id): Path<String>,
) -> Result<Json<GetSpeechResponse>, ApiError> {
    let speech_id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::bad_request(format!("'{}' is not a valid speech id", id)))?;

    let speech = state
        .orchestrator
        .get(ArtifactKind::Speech, speech_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Speech '{}' not found", id)))?;

    Ok(Json(GetSpeechResponse {
        speech: speech.content,
        created_at: speech.created_at,
    }))
}
