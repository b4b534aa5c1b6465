//! HTTP handlers for the letter API
//!
//! - POST /generate-letter          — draft a letter and store it
//! - POST /send-email               — email a letter and record the delivery
//! - GET  /letters                  — most recent letters
//! - GET  /letters/:id              — letter detail
//! - GET  /letters/email/:address   — letters delivered to an address

use crate::api::ApiError;
use crate::artifact::{Artifact, ArtifactKind, DraftRequest};
use crate::letters::types::*;
use crate::notifier::DeliveryMetadata;
use crate::orchestrator::Orchestrator;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Shared state for letter handlers
#[derive(Clone)]
pub struct LettersState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Create the letters router
pub fn letters_router(state: LettersState) -> Router {
    Router::new()
        .route("/generate-letter", post(generate_letter))
        .route("/send-email", post(send_email))
        .route("/letters", get(list_letters))
        .route("/letters/:id", get(get_letter))
        .route("/letters/email/:address", get(letters_by_email))
        .with_state(state)
}

fn to_views(artifacts: Vec<Artifact>) -> Vec<LetterView> {
    artifacts
        .into_iter()
        .filter_map(LetterView::from_artifact)
        .collect()
}

/// POST /generate-letter
async fn generate_letter(
    State(state): State<LettersState>,
    payload: Result<Json<LetterRequest>, JsonRejection>,
) -> Result<Json<LetterResponse>, ApiError> {
    let Json(request) = payload?;
    let outcome = state
        .orchestrator
        .generate(DraftRequest::Letter(request))
        .await?;

    let letter_id = outcome.persistence.id();
    let message = if letter_id.is_some() {
        "Letter generated and saved"
    } else {
        "Letter generated but could not be saved"
    };
    Ok(Json(LetterResponse {
        content: outcome.value,
        message: message.to_string(),
        letter_id,
    }))
}

/// POST /send-email
async fn send_email(
    State(state): State<LettersState>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let Json(request) = payload?;
    request
        .validate()
        .map_err(|issues| ApiError::bad_request(issues.join("; ")))?;

    let metadata = DeliveryMetadata::letter(
        request.subject,
        request.tone.to_string(),
        request.sender_name,
        request.recipient_name,
    );
    let outcome = state
        .orchestrator
        .send(&request.content, &request.email, request.letter_id, &metadata)
        .await?;

    Ok(Json(SendEmailResponse {
        email_sent: true,
        message: format!("Email sent successfully to {}", request.email),
        letter_id: outcome.persistence.id(),
        matched_by: outcome.persistence.matched_by(),
    }))
}

/// GET /letters?limit=10
async fn list_letters(
    State(state): State<LettersState>,
    query: Result<Query<ListLettersQuery>, QueryRejection>,
) -> Result<Json<LetterListResponse>, ApiError> {
    let Query(query) = query?;
    let letters = to_views(
        state
            .orchestrator
            .list_recent(ArtifactKind::Letter, query.limit)
            .await?,
    );

    Ok(Json(LetterListResponse {
        count: letters.len(),
        message: format!("{} letter(s) found", letters.len()),
        letters,
    }))
}

/// GET /letters/:id
async fn get_letter(
    State(state): State<LettersState>,
    Path(id): Path<String>,
) -> Result<Json<LetterDetailResponse>, ApiError> {
    let not_found = || ApiError::not_found(format!("Letter '{}' not found", id));
    let letter_id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    let letter = state
        .orchestrator
        .get(ArtifactKind::Letter, letter_id)
        .await?
        .and_then(LetterView::from_artifact)
        .ok_or_else(not_found)?;

    Ok(Json(LetterDetailResponse {
        letter,
        message: "Letter found".to_string(),
    }))
}

/// GET /letters/email/:address
async fn letters_by_email(
    State(state): State<LettersState>,
    Path(address): Path<String>,
) -> Result<Json<LetterListResponse>, ApiError> {
    let letters = to_views(
        state
            .orchestrator
            .list_by_destination(ArtifactKind::Letter, &address)
            .await?,
    );

    Ok(Json(LetterListResponse {
        count: letters.len(),
        message: format!("{} letter(s) found for {}", letters.len(), address.trim()),
        letters,
    }))
}
