//! In-memory record store
//!
//! Holds artifacts in a `RwLock<Vec<_>>` ordered newest first. Used for
//! local development (`store.backend = "memory"`) and as the reference
//! behaviour the hosted backend is tested against.

use super::{RecordStore, StoreResult};
use crate::artifact::{Artifact, ArtifactKind, DeliveryStatus, ListLimit, NewArtifact};
use crate::error::PersistenceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local artifact store
#[derive(Default)]
pub struct MemoryStore {
    artifacts: Arc<RwLock<Vec<Artifact>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with an explicit creation time
    pub async fn create_at(&self, artifact: NewArtifact, created_at: DateTime<Utc>) -> Artifact {
        let stored = Artifact {
            id: Uuid::new_v4(),
            content: artifact.content,
            request: artifact.request,
            delivery: DeliveryStatus::default(),
            created_at,
            updated_at: None,
        };

        let mut artifacts = self.artifacts.write().await;
        // Keep newest-first order even when timestamps arrive out of order
        let pos = artifacts
            .iter()
            .position(|a| a.created_at <= created_at)
            .unwrap_or(artifacts.len());
        artifacts.insert(pos, stored.clone());
        stored
    }

    pub async fn len(&self) -> usize {
        self.artifacts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.artifacts.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, artifact: NewArtifact) -> StoreResult<Artifact> {
        Ok(self.create_at(artifact, Utc::now()).await)
    }

    async fn update_delivery_status(
        &self,
        kind: ArtifactKind,
        id: Uuid,
        sent: bool,
        destination: Option<&str>,
    ) -> StoreResult<()> {
        let mut artifacts = self.artifacts.write().await;
        let artifact = artifacts
            .iter_mut()
            .find(|a| a.id == id && a.kind() == kind)
            .ok_or(PersistenceError::NotFound(id))?;

        artifact.delivery.email_sent = sent;
        if let Some(destination) = destination {
            artifact.delivery.destination_email = Some(destination.to_string());
        }
        artifact.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn get_by_id(&self, kind: ArtifactKind, id: Uuid) -> StoreResult<Option<Artifact>> {
        Ok(self
            .artifacts
            .read()
            .await
            .iter()
            .find(|a| a.id == id && a.kind() == kind)
            .cloned())
    }

    async fn list_recent(
        &self,
        kind: ArtifactKind,
        limit: ListLimit,
    ) -> StoreResult<Vec<Artifact>> {
        Ok(self
            .artifacts
            .read()
            .await
            .iter()
            .filter(|a| a.kind() == kind)
            .take(limit.get())
            .cloned()
            .collect())
    }

    async fn list_by_destination(
        &self,
        kind: ArtifactKind,
        destination: &str,
    ) -> StoreResult<Vec<Artifact>> {
        Ok(self
            .artifacts
            .read()
            .await
            .iter()
            .filter(|a| {
                a.kind() == kind && a.delivery.destination_email.as_deref() == Some(destination)
            })
            .cloned()
            .collect())
    }

    async fn find_by_content_prefix(
        &self,
        kind: ArtifactKind,
        prefix: &str,
    ) -> StoreResult<Option<Artifact>> {
        Ok(self
            .artifacts
            .read()
            .await
            .iter()
            .find(|a| a.kind() == kind && a.content_starts_with(prefix))
            .cloned())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::DraftRequest;
    use crate::letters::types::LetterRequest;
    use crate::speeches::types::SpeechRequest;
    use chrono::Duration;

    fn letter(content: &str) -> NewArtifact {
        NewArtifact {
            content: content.to_string(),
            request: DraftRequest::Letter(LetterRequest::sample()),
        }
    }

    fn speech(content: &str) -> NewArtifact {
        NewArtifact {
            content: content.to_string(),
            request: DraftRequest::Speech(SpeechRequest::sample()),
        }
    }

    fn limit(n: i64) -> ListLimit {
        ListLimit::new(n, 100).unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_default_status() {
        let store = MemoryStore::new();
        let stored = store.create(letter("Madame,")).await.unwrap();

        assert!(!stored.delivery.email_sent);
        assert!(stored.delivery.destination_email.is_none());
        let fetched = store
            .get_by_id(ArtifactKind::Letter, stored.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn test_get_unknown_is_none() {
        let store = MemoryStore::new();
        let found = store
            .get_by_id(ArtifactKind::Letter, Uuid::new_v4())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_kinds_are_isolated() {
        let store = MemoryStore::new();
        let stored = store.create(speech("Chers amis")).await.unwrap();

        assert!(store
            .get_by_id(ArtifactKind::Letter, stored.id)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_content_prefix(ArtifactKind::Letter, "Chers")
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            store
                .update_delivery_status(ArtifactKind::Letter, stored.id, true, None)
                .await,
            Err(PersistenceError::NotFound(stored.id))
        );
    }

    #[tokio::test]
    async fn test_prefix_match_prefers_most_recent() {
        let store = MemoryStore::new();
        let t1 = Utc::now() - Duration::minutes(5);
        let t2 = Utc::now();
        store.create_at(letter("Dear Sir..."), t1).await;
        let newer = store
            .create_at(letter("Dear Sir, following up..."), t2)
            .await;

        let found = store
            .find_by_content_prefix(ArtifactKind::Letter, "Dear Sir")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, newer.id);
    }

    #[tokio::test]
    async fn test_prefix_match_orders_by_timestamp_not_insertion() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let newer = store.create_at(letter("Dear Sir, B"), now).await;
        store
            .create_at(letter("Dear Sir, A"), now - Duration::hours(1))
            .await;

        let found = store
            .find_by_content_prefix(ArtifactKind::Letter, "dear sir")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, newer.id);
    }

    #[tokio::test]
    async fn test_prefix_match_folds_sigma_per_character() {
        let store = MemoryStore::new();
        let stored = store.create(letter("ΣΣΑΣ letter body")).await.unwrap();

        // "ΣΣ" on its own would lowercase to "σς" as a whole string
        for prefix in ["ΣΣ", "σσ", "ΣΣΑΣ", "σσασ letter"] {
            let found = store
                .find_by_content_prefix(ArtifactKind::Letter, prefix)
                .await
                .unwrap();
            assert_eq!(found.map(|a| a.id), Some(stored.id), "{}", prefix);
        }
    }

    #[tokio::test]
    async fn test_prefix_longer_than_content_is_none() {
        let store = MemoryStore::new();
        store.create(letter("Dear")).await.unwrap();

        let found = store
            .find_by_content_prefix(ArtifactKind::Letter, "Dear Sir")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_prefix_without_match_is_none() {
        let store = MemoryStore::new();
        store.create(letter("Dear Sir")).await.unwrap();

        let found = store
            .find_by_content_prefix(ArtifactKind::Letter, "To whom it may concern")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_recent_caps_and_orders() {
        let store = MemoryStore::new();
        let base = Utc::now();
        for i in 0..5 {
            store
                .create_at(letter(&format!("Letter {}", i)), base + Duration::seconds(i))
                .await;
        }

        let recent = store
            .list_recent(ArtifactKind::Letter, limit(3))
            .await
            .unwrap();
        let contents: Vec<_> = recent.iter().map(|a| a.content.as_str()).collect();
        assert_eq!(contents, vec!["Letter 4", "Letter 3", "Letter 2"]);
    }

    #[tokio::test]
    async fn test_update_delivery_status_is_idempotent() {
        let store = MemoryStore::new();
        let stored = store.create(letter("Madame,")).await.unwrap();

        store
            .update_delivery_status(ArtifactKind::Letter, stored.id, true, Some("a@b.co"))
            .await
            .unwrap();
        let once = store
            .get_by_id(ArtifactKind::Letter, stored.id)
            .await
            .unwrap()
            .unwrap();

        store
            .update_delivery_status(ArtifactKind::Letter, stored.id, true, Some("a@b.co"))
            .await
            .unwrap();
        let twice = store
            .get_by_id(ArtifactKind::Letter, stored.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(once.delivery, twice.delivery);
        assert_eq!(once.content, twice.content);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_without_destination_keeps_previous() {
        let store = MemoryStore::new();
        let stored = store.create(letter("Madame,")).await.unwrap();
        store
            .update_delivery_status(ArtifactKind::Letter, stored.id, true, Some("a@b.co"))
            .await
            .unwrap();
        store
            .update_delivery_status(ArtifactKind::Letter, stored.id, false, None)
            .await
            .unwrap();

        let fetched = store
            .get_by_id(ArtifactKind::Letter, stored.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!fetched.delivery.email_sent);
        assert_eq!(fetched.delivery.destination_email.as_deref(), Some("a@b.co"));
        assert!(fetched.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_list_by_destination() {
        let store = MemoryStore::new();
        let a = store.create(letter("First")).await.unwrap();
        let b = store.create(letter("Second")).await.unwrap();
        store.create(letter("Unsent")).await.unwrap();
        for id in [a.id, b.id] {
            store
                .update_delivery_status(ArtifactKind::Letter, id, true, Some("jean@example.fr"))
                .await
                .unwrap();
        }

        let sent = store
            .list_by_destination(ArtifactKind::Letter, "jean@example.fr")
            .await
            .unwrap();
        assert_eq!(sent.len(), 2);
        assert!(store
            .list_by_destination(ArtifactKind::Letter, "other@example.fr")
            .await
            .unwrap()
            .is_empty());
    }
}
