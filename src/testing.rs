//! Shared test doubles

use crate::artifact::{Artifact, ArtifactKind, DraftRequest, EmailAddress, ListLimit, NewArtifact};
use crate::error::{DeliveryError, GenerationError, PersistenceError};
use crate::generator::ContentGenerator;
use crate::notifier::{DeliveryMetadata, Notifier};
use crate::store::{RecordStore, StoreResult};
use async_trait::async_trait;
use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn serve_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Generator returning canned text, or a canned failure
pub struct StaticGenerator {
    result: Result<String, GenerationError>,
    pub calls: AtomicUsize,
}

impl StaticGenerator {
    pub fn ok(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: GenerationError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ContentGenerator for StaticGenerator {
    async fn generate(&self, _request: &DraftRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }

    fn model_name(&self) -> &str {
        "static"
    }
}

/// Notifier that records deliveries, optionally failing every attempt
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String, DeliveryMetadata)>>,
    failure: Option<DeliveryError>,
}

impl RecordingNotifier {
    pub fn failing(error: DeliveryError) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        destination: &EmailAddress,
        text: &str,
        metadata: &DeliveryMetadata,
    ) -> Result<(), DeliveryError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.sent.lock().unwrap().push((
            destination.to_string(),
            text.to_string(),
            metadata.clone(),
        ));
        Ok(())
    }

    fn transport_name(&self) -> &str {
        "recording"
    }
}

/// Store whose every call fails; counts the calls it receives
#[derive(Default)]
pub struct FailingStore {
    pub calls: AtomicUsize,
}

impl FailingStore {
    fn fail<T>(&self, error: PersistenceError) -> StoreResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(error)
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn create(&self, _artifact: NewArtifact) -> StoreResult<Artifact> {
        self.fail(PersistenceError::Write("store offline".to_string()))
    }

    async fn update_delivery_status(
        &self,
        _kind: ArtifactKind,
        _id: Uuid,
        _sent: bool,
        _destination: Option<&str>,
    ) -> StoreResult<()> {
        self.fail(PersistenceError::Write("store offline".to_string()))
    }

    async fn get_by_id(&self, _kind: ArtifactKind, _id: Uuid) -> StoreResult<Option<Artifact>> {
        self.fail(PersistenceError::Read("store offline".to_string()))
    }

    async fn list_recent(
        &self,
        _kind: ArtifactKind,
        _limit: ListLimit,
    ) -> StoreResult<Vec<Artifact>> {
        self.fail(PersistenceError::Read("store offline".to_string()))
    }

    async fn list_by_destination(
        &self,
        _kind: ArtifactKind,
        _destination: &str,
    ) -> StoreResult<Vec<Artifact>> {
        self.fail(PersistenceError::Read("store offline".to_string()))
    }

    async fn find_by_content_prefix(
        &self,
        _kind: ArtifactKind,
        _prefix: &str,
    ) -> StoreResult<Option<Artifact>> {
        self.fail(PersistenceError::Read("store offline".to_string()))
    }

    fn backend_name(&self) -> &str {
        "failing"
    }
}
