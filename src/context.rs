//! Application assembly
//!
//! Builds the generator, notifier and record store from configuration and
//! resolved credentials, and wires them into a single [`Orchestrator`].

use crate::api::build_app;
use crate::config::{LetterdeskConfig, ResolvedSecrets, StoreBackend};
use crate::error::{Error, Result};
use crate::generator::{ContentGenerator, OpenAiGenerator};
use crate::notifier::{Notifier, SmtpNotifier};
use crate::orchestrator::Orchestrator;
use crate::store::{MemoryStore, RecordStore, SupabaseStore};
use axum::Router;
use std::sync::Arc;

/// Everything a running server needs
pub struct AppContext {
    pub config: LetterdeskConfig,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppContext {
    /// Resolve credentials from the environment and build every collaborator
    pub fn build(config: LetterdeskConfig) -> Result<Self> {
        let secrets = config.resolve_secrets()?;
        Self::build_with(config, secrets)
    }

    /// Build from already resolved credentials
    pub fn build_with(config: LetterdeskConfig, secrets: ResolvedSecrets) -> Result<Self> {
        config.validate()?;

        let generator: Arc<dyn ContentGenerator> =
            Arc::new(OpenAiGenerator::new(&config.llm, secrets.llm_api_key.clone())?);
        let notifier: Arc<dyn Notifier> = Arc::new(SmtpNotifier::new(
            &config.smtp,
            secrets.smtp_username.clone(),
            secrets.smtp_password.clone(),
        )?);
        let store: Arc<dyn RecordStore> = match config.store.backend {
            StoreBackend::Supabase => {
                let (url, key) = secrets.store.clone().ok_or_else(|| {
                    Error::Config("supabase backend selected but no store credentials".to_string())
                })?;
                Arc::new(SupabaseStore::new(&config.store, &url, key)?)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory record store; records are lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        tracing::info!(
            model = %config.llm.model,
            smtp_host = %config.smtp.host,
            store = %config.store.backend,
            "Collaborators ready"
        );

        let orchestrator = Orchestrator::new(generator, notifier, store, config.reconcile.clone());
        Ok(Self {
            config,
            orchestrator: Arc::new(orchestrator),
        })
    }

    /// The HTTP application for this context
    pub fn router(&self) -> Router {
        build_app(self.orchestrator.clone(), &self.config.server.cors_origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Secret;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn secrets(store: Option<(Secret, Secret)>) -> ResolvedSecrets {
        ResolvedSecrets {
            llm_api_key: Secret::new("sk-test"),
            smtp_username: Secret::new("bot@example.com"),
            smtp_password: Secret::new("pw"),
            store,
        }
    }

    #[tokio::test]
    async fn test_build_with_memory_store() {
        let mut config = LetterdeskConfig::default();
        config.store.backend = StoreBackend::Memory;

        let ctx = AppContext::build_with(config, secrets(None)).unwrap();
        assert_eq!(ctx.orchestrator.store_backend(), "memory");
        assert_eq!(ctx.orchestrator.model_name(), "gpt-4o-mini");
        assert_eq!(ctx.orchestrator.notifier_transport(), "mail.infomaniak.com:465");

        let resp = ctx
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_build_with_supabase_store() {
        let config = LetterdeskConfig::default();
        let ctx = AppContext::build_with(
            config,
            secrets(Some((
                Secret::new("https://project.supabase.co"),
                Secret::new("anon"),
            ))),
        )
        .unwrap();
        assert_eq!(ctx.orchestrator.store_backend(), "supabase");
    }

    #[tokio::test]
    async fn test_supabase_without_credentials_fails() {
        let result = AppContext::build_with(LetterdeskConfig::default(), secrets(None));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        let mut config = LetterdeskConfig::default();
        config.store.backend = StoreBackend::Memory;
        config.reconcile.prefix_chars = 0;
        assert!(AppContext::build_with(config, secrets(None)).is_err());
    }
}
