//! Supabase (PostgREST) record store
//!
//! Talks to `{project_url}/rest/v1/{table}` with the project API key. Rows
//! carry the request fields as plain columns next to `id`, `content`,
//! `destination_email`, `email_sent`, `created_at` and `updated_at`
//! (`timestamptz`).

use super::{RecordStore, StoreResult};
use crate::artifact::{Artifact, ArtifactKind, DeliveryStatus, DraftRequest, ListLimit, NewArtifact};
use crate::config::{Secret, StoreConfig};
use crate::error::{Error, PersistenceError, Result};
use crate::letters::types::LetterRequest;
use crate::speeches::types::SpeechRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

#[derive(Serialize)]
struct InsertRow<'a, R: Serialize> {
    #[serde(flatten)]
    request: &'a R,
    content: &'a str,
    email_sent: bool,
}

#[derive(Deserialize)]
struct StoredRow<R> {
    id: Uuid,
    #[serde(flatten)]
    request: R,
    content: String,
    #[serde(default)]
    destination_email: Option<String>,
    #[serde(default)]
    email_sent: bool,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl<R> StoredRow<R> {
    fn into_artifact(self, wrap: fn(R) -> DraftRequest) -> Artifact {
        Artifact {
            id: self.id,
            content: self.content,
            request: wrap(self.request),
            delivery: DeliveryStatus {
                email_sent: self.email_sent,
                destination_email: self.destination_email,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn decode(kind: ArtifactKind, row: Value) -> StoreResult<Artifact> {
    let decoded = match kind {
        ArtifactKind::Letter => serde_json::from_value::<StoredRow<LetterRequest>>(row)
            .map(|r| r.into_artifact(DraftRequest::Letter)),
        ArtifactKind::Speech => serde_json::from_value::<StoredRow<SpeechRequest>>(row)
            .map(|r| r.into_artifact(DraftRequest::Speech)),
    };
    decoded.map_err(|e| PersistenceError::Read(format!("malformed {} row: {}", kind, e)))
}

/// Escape a literal prefix for a PostgREST `ilike` pattern.
///
/// PostgREST turns every `*` into `%`, so a literal `*` cannot be expressed
/// and is widened to the single-character wildcard `_`.
fn like_prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        match c {
            '\\' => pattern.push_str("\\\\"),
            '%' => pattern.push_str("\\%"),
            '_' => pattern.push_str("\\_"),
            '*' => pattern.push('_'),
            _ => pattern.push(c),
        }
    }
    pattern.push('*');
    pattern
}

/// Record store backed by a Supabase project
pub struct SupabaseStore {
    client: Client,
    rest_url: String,
    api_key: Secret,
    letters_table: String,
    speeches_table: String,
}

impl SupabaseStore {
    pub fn new(config: &StoreConfig, project_url: &Secret, api_key: Secret) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to create store HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", project_url.expose().trim_end_matches('/')),
            api_key,
            letters_table: config.letters_table.clone(),
            speeches_table: config.speeches_table.clone(),
        })
    }

    fn table(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Letter => &self.letters_table,
            ArtifactKind::Speech => &self.speeches_table,
        }
    }

    fn request(&self, method: Method, kind: ArtifactKind) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, self.table(kind)))
            .header("apikey", self.api_key.expose())
            .bearer_auth(self.api_key.expose())
    }

    /// Send and decode a JSON array of rows; `on_error` picks the error variant
    async fn rows(
        &self,
        builder: RequestBuilder,
        on_error: fn(String) -> PersistenceError,
    ) -> StoreResult<Vec<Value>> {
        let response = builder
            .send()
            .await
            .map_err(|e| on_error(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(on_error(format!("status {}: {}", status, detail)));
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| on_error(format!("unexpected response body: {}", e)))
    }

    async fn select(
        &self,
        kind: ArtifactKind,
        query: &[(&str, String)],
    ) -> StoreResult<Vec<Artifact>> {
        let builder = self
            .request(Method::GET, kind)
            .query(&[("select", "*")])
            .query(query);
        self.rows(builder, PersistenceError::Read)
            .await?
            .into_iter()
            .map(|row| decode(kind, row))
            .collect()
    }
}

#[async_trait]
impl RecordStore for SupabaseStore {
    async fn create(&self, artifact: NewArtifact) -> StoreResult<Artifact> {
        let kind = artifact.kind();
        let builder = self
            .request(Method::POST, kind)
            .header("Prefer", "return=representation");
        let builder = match &artifact.request {
            DraftRequest::Letter(request) => builder.json(&InsertRow {
                request,
                content: &artifact.content,
                email_sent: false,
            }),
            DraftRequest::Speech(request) => builder.json(&InsertRow {
                request,
                content: &artifact.content,
                email_sent: false,
            }),
        };

        let row = self
            .rows(builder, PersistenceError::Write)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PersistenceError::Write("insert returned no row".to_string()))?;
        decode(kind, row).map_err(|e| PersistenceError::Write(e.to_string()))
    }

    async fn update_delivery_status(
        &self,
        kind: ArtifactKind,
        id: Uuid,
        sent: bool,
        destination: Option<&str>,
    ) -> StoreResult<()> {
        let mut body = serde_json::json!({
            "email_sent": sent,
            "updated_at": Utc::now(),
        });
        if let Some(destination) = destination {
            body["destination_email"] = Value::String(destination.to_string());
        }

        let builder = self
            .request(Method::PATCH, kind)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", id))])
            .json(&body);

        let updated = self.rows(builder, PersistenceError::Write).await?;
        if updated.is_empty() {
            return Err(PersistenceError::NotFound(id));
        }
        Ok(())
    }

    async fn get_by_id(&self, kind: ArtifactKind, id: Uuid) -> StoreResult<Option<Artifact>> {
        let mut rows = self.select(kind, &[("id", format!("eq.{}", id))]).await?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    async fn list_recent(
        &self,
        kind: ArtifactKind,
        limit: ListLimit,
    ) -> StoreResult<Vec<Artifact>> {
        self.select(
            kind,
            &[
                ("order", "created_at.desc".to_string()),
                ("limit", limit.get().to_string()),
            ],
        )
        .await
    }

    async fn list_by_destination(
        &self,
        kind: ArtifactKind,
        destination: &str,
    ) -> StoreResult<Vec<Artifact>> {
        self.select(
            kind,
            &[
                ("destination_email", format!("eq.{}", destination)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn find_by_content_prefix(
        &self,
        kind: ArtifactKind,
        prefix: &str,
    ) -> StoreResult<Option<Artifact>> {
        let rows = self
            .select(
                kind,
                &[
                    ("content", format!("ilike.{}", like_prefix_pattern(prefix))),
                    ("order", "created_at.desc".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    fn backend_name(&self) -> &str {
        "supabase"
    }
}
