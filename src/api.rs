//! Unified API router for Letterdesk
//!
//! Merges the letter and speech routers into a single axum `Router` with
//! CORS, request tracing and a shared JSON error envelope.
//!
//! ## Endpoint Map
//!
//! | Path                        | Module   | Description                     |
//! |-----------------------------|----------|---------------------------------|
//! | `/`, `/health`              | api      | Status checks                   |
//! | `/generate-letter`          | letters  | Draft and store a letter        |
//! | `/send-email`               | letters  | Email a letter                  |
//! | `/letters`, `/letters/*`    | letters  | Stored letters                  |
//! | `/generate-speech`          | speeches | Draft and store a wedding speech|
//! | `/send-speech`              | speeches | Email a speech                  |
//! | `/speech/:id`               | speeches | Stored speech                   |

use crate::error::{Error, PersistenceError};
use crate::letters::{letters_router, LettersState};
use crate::orchestrator::Orchestrator;
use crate::speeches::{speeches_router, SpeechesState};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        State,
    },
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Letterdesk HTTP application
pub fn build_app(orchestrator: Arc<Orchestrator>, cors_origins: &[String]) -> Router {
    let cors = build_cors(cors_origins);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(orchestrator.clone())
        .merge(letters_router(LettersState {
            orchestrator: orchestrator.clone(),
        }))
        .merge(speeches_router(SpeechesState { orchestrator }))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// =============================================================================
// Error envelope
// =============================================================================

/// API error response: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ApiErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => Self::bad_request(msg),
            Error::Generation(e) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "GENERATION_FAILED",
                format!("Content generation failed: {}", e),
            ),
            Error::Delivery(e) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DELIVERY_FAILED",
                format!("Email delivery failed: {}", e),
            ),
            Error::Persistence(PersistenceError::NotFound(id)) => {
                Self::not_found(format!("Record '{}' not found", id))
            }
            Error::Persistence(e) => {
                tracing::error!(error = %e, "Record store error");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_FAILED",
                    format!("Record store unavailable: {}", e),
                )
            }
            other => {
                tracing::error!(error = %other, "Internal error");
                Self::internal(other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

// =============================================================================
// Root handlers
// =============================================================================

#[derive(Serialize)]
struct RootResponse {
    message: String,
    version: String,
    status: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    model: String,
    smtp: String,
    store: String,
}

async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: "Letterdesk API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
    })
}

async fn health_check(State(orchestrator): State<Arc<Orchestrator>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: orchestrator.model_name().to_string(),
        smtp: orchestrator.notifier_transport().to_string(),
        store: orchestrator.store_backend().to_string(),
    })
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(parsed)
    }
}
