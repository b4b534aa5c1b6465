//! Record store for generated artifacts
//!
//! Every operation is scoped to an [`ArtifactKind`]: letters and speeches
//! live in separate tables and never match each other's queries.
//!
//! `find_by_content_prefix` is a heuristic. It exists so a send request that
//! lost the record identifier can still be tied back to its stored artifact,
//! and it can pick the wrong record when two artifacts share their leading
//! characters.

pub mod memory;
pub mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use crate::artifact::{Artifact, ArtifactKind, ListLimit, NewArtifact};
use crate::error::PersistenceError;
use async_trait::async_trait;
use uuid::Uuid;

pub type StoreResult<T> = std::result::Result<T, PersistenceError>;

/// Persistence for artifacts and their delivery status
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new artifact; the returned artifact carries the assigned id
    async fn create(&self, artifact: NewArtifact) -> StoreResult<Artifact>;

    /// Overwrite the delivery status. `destination` is only written when given.
    async fn update_delivery_status(
        &self,
        kind: ArtifactKind,
        id: Uuid,
        sent: bool,
        destination: Option<&str>,
    ) -> StoreResult<()>;

    /// Look up by identifier; unknown ids are `Ok(None)`
    async fn get_by_id(&self, kind: ArtifactKind, id: Uuid) -> StoreResult<Option<Artifact>>;

    /// Most recent first, at most `limit`
    async fn list_recent(&self, kind: ArtifactKind, limit: ListLimit) -> StoreResult<Vec<Artifact>>;

    /// Every artifact delivered to `destination`, most recent first
    async fn list_by_destination(
        &self,
        kind: ArtifactKind,
        destination: &str,
    ) -> StoreResult<Vec<Artifact>>;

    /// Most recent artifact whose content starts with `prefix`, ignoring case
    async fn find_by_content_prefix(
        &self,
        kind: ArtifactKind,
        prefix: &str,
    ) -> StoreResult<Option<Artifact>>;

    /// Backend name, for health reporting
    fn backend_name(&self) -> &str;
}
