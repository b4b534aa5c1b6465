//! Generate and send workflows
//!
//! The orchestrator ties the generator, the notifier and the record store
//! together. Persistence is best effort in both workflows: a store failure is
//! logged and reported in [`PersistenceOutcome`], never returned as the
//! workflow's error.

use crate::artifact::{
    content_prefix, Artifact, ArtifactKind, DraftRequest, EmailAddress, ListLimit, NewArtifact,
};
use crate::config::ReconcileConfig;
use crate::error::{Error, PersistenceError, Result};
use crate::generator::ContentGenerator;
use crate::notifier::{DeliveryMetadata, Notifier};
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// How the record updated at send time was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedBy {
    /// The caller supplied the identifier
    Identifier,
    /// Heuristic match on the leading characters of the content
    ContentPrefix,
}

/// What happened to the stored record during a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceOutcome {
    /// A new record was stored
    Created(Uuid),
    /// An existing record's delivery status was updated
    Updated { id: Uuid, matched_by: MatchedBy },
    /// No record could be associated with the delivery
    Unresolved,
    /// The store call failed; `id` is the record it was aimed at, if known
    Failed {
        id: Option<Uuid>,
        error: PersistenceError,
    },
}

impl PersistenceOutcome {
    /// Identifier of the record that was written successfully
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Self::Created(id) | Self::Updated { id, .. } => Some(*id),
            Self::Unresolved | Self::Failed { .. } => None,
        }
    }

    pub fn matched_by(&self) -> Option<MatchedBy> {
        match self {
            Self::Updated { matched_by, .. } => Some(*matched_by),
            _ => None,
        }
    }
}

/// A workflow's primary result plus its secondary persistence outcome
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub persistence: PersistenceOutcome,
}

/// Coordinates generation, delivery and persistence
pub struct Orchestrator {
    generator: Arc<dyn ContentGenerator>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn RecordStore>,
    reconcile: ReconcileConfig,
}

impl Orchestrator {
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn RecordStore>,
        reconcile: ReconcileConfig,
    ) -> Self {
        Self {
            generator,
            notifier,
            store,
            reconcile,
        }
    }

    /// Draft content for `request` and try to store it
    pub async fn generate(&self, request: DraftRequest) -> Result<Outcome<String>> {
        request
            .validate()
            .map_err(|issues| Error::Validation(issues.join("; ")))?;

        let kind = request.kind();
        let content = self.generator.generate(&request).await.map_err(|e| {
            tracing::error!(%kind, error = %e, "Generation failed");
            e
        })?;
        tracing::info!(%kind, chars = content.chars().count(), "Content generated");

        let persistence = match self
            .store
            .create(NewArtifact {
                content: content.clone(),
                request,
            })
            .await
        {
            Ok(stored) => {
                tracing::info!(%kind, id = %stored.id, "Artifact stored");
                PersistenceOutcome::Created(stored.id)
            }
            Err(error) => {
                tracing::warn!(
                    %kind,
                    error = %error,
                    "Artifact not stored, returning content without id"
                );
                PersistenceOutcome::Failed { id: None, error }
            }
        };

        Ok(Outcome {
            value: content,
            persistence,
        })
    }

    /// Deliver `content` and record the delivery against its stored artifact
    pub async fn send(
        &self,
        content: &str,
        destination: &EmailAddress,
        identifier: Option<Uuid>,
        metadata: &DeliveryMetadata,
    ) -> Result<Outcome<()>> {
        if content.trim().is_empty() {
            return Err(Error::Validation("content is empty".to_string()));
        }
        let kind = metadata.kind;

        self.notifier.send(destination, content, metadata).await?;

        let resolved = match identifier {
            Some(id) => Ok(Some((id, MatchedBy::Identifier))),
            None => self.resolve_by_prefix(kind, content).await,
        };

        let persistence = match resolved {
            Ok(Some((id, matched_by))) => match self
                .store
                .update_delivery_status(kind, id, true, Some(destination.as_str()))
                .await
            {
                Ok(()) => {
                    tracing::info!(%kind, %id, ?matched_by, "Delivery status recorded");
                    PersistenceOutcome::Updated { id, matched_by }
                }
                Err(error) => {
                    tracing::warn!(%kind, %id, error = %error, "Delivery status not recorded");
                    PersistenceOutcome::Failed {
                        id: Some(id),
                        error,
                    }
                }
            },
            Ok(None) => {
                tracing::info!(%kind, "No stored record matches the delivered content");
                PersistenceOutcome::Unresolved
            }
            Err(error) => {
                tracing::warn!(%kind, error = %error, "Record lookup failed");
                PersistenceOutcome::Failed { id: None, error }
            }
        };

        Ok(Outcome {
            value: (),
            persistence,
        })
    }

    async fn resolve_by_prefix(
        &self,
        kind: ArtifactKind,
        content: &str,
    ) -> std::result::Result<Option<(Uuid, MatchedBy)>, PersistenceError> {
        if !self.reconcile.content_prefix_fallback {
            return Ok(None);
        }
        let prefix = content_prefix(content.trim_start(), self.reconcile.prefix_chars);
        let found = self.store.find_by_content_prefix(kind, prefix).await?;
        Ok(found.map(|artifact| {
            tracing::warn!(
                %kind,
                id = %artifact.id,
                prefix_chars = prefix.chars().count(),
                "Record matched by content prefix; clients should send the identifier"
            );
            (artifact.id, MatchedBy::ContentPrefix)
        }))
    }

    pub async fn get(&self, kind: ArtifactKind, id: Uuid) -> Result<Option<Artifact>> {
        Ok(self.store.get_by_id(kind, id).await?)
    }

    /// Most recent artifacts; `requested` defaults to the configured page size
    pub async fn list_recent(
        &self,
        kind: ArtifactKind,
        requested: Option<i64>,
    ) -> Result<Vec<Artifact>> {
        let requested = requested.unwrap_or(self.reconcile.default_list_limit as i64);
        let limit = ListLimit::new(requested, self.reconcile.max_list_limit)?;
        Ok(self.store.list_recent(kind, limit).await?)
    }

    pub async fn list_by_destination(
        &self,
        kind: ArtifactKind,
        destination: &str,
    ) -> Result<Vec<Artifact>> {
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(Error::Validation("email address is empty".to_string()));
        }
        Ok(self.store.list_by_destination(kind, destination).await?)
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    pub fn notifier_transport(&self) -> &str {
        self.notifier.transport_name()
    }

    pub fn store_backend(&self) -> &str {
        self.store.backend_name()
    }
}
