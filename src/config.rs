//! Letterdesk configuration management
//!
//! Configuration lives in a TOML file. Credentials never do: every `*_ref`
//! field names an environment variable that is resolved at startup, and the
//! process refuses to start while any of them is missing.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Main Letterdesk configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterdeskConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Language model configuration
    pub llm: LlmConfig,

    /// Outbound mail configuration
    pub smtp: SmtpConfig,

    /// Record store configuration
    pub store: StoreConfig,

    /// Send-time record reconciliation and listing bounds
    pub reconcile: ReconcileConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: Vec::new(),
        }
    }
}

/// Language model configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_ref: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// Language the drafts are written in
    pub language: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_ref: "openai_api_key".to_string(),
            temperature: 0.7,
            max_tokens: 1500,
            language: "French".to_string(),
            timeout_secs: 120,
        }
    }
}

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    /// TLS from the first byte (SMTPS, usually port 465)
    Implicit,
    /// Plaintext upgraded with STARTTLS (usually port 587)
    Starttls,
    /// No encryption; local relays and test servers only
    None,
}

/// Outbound mail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// Relay host
    pub host: String,

    /// Relay port
    pub port: u16,

    /// Connection security
    pub tls: SmtpTls,

    /// Environment variable holding the SMTP username (also the From address)
    pub username_ref: String,

    /// Environment variable holding the SMTP password
    pub password_ref: String,

    /// Display name used in the From header
    pub from_name: String,

    /// Transport timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "mail.infomaniak.com".to_string(),
            port: 465,
            tls: SmtpTls::Implicit,
            username_ref: "smtp_username".to_string(),
            password_ref: "smtp_password".to_string(),
            from_name: "Letterdesk".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Record store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Hosted Postgres behind a PostgREST (Supabase) endpoint
    Supabase,
    /// Process-local store, lost on restart
    Memory,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Supabase => write!(f, "supabase"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend selection
    pub backend: StoreBackend,

    /// Environment variable holding the project URL
    pub url_ref: String,

    /// Environment variable holding the API key
    pub key_ref: String,

    /// Table holding letters
    pub letters_table: String,

    /// Table holding wedding speeches
    pub speeches_table: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Supabase,
            url_ref: "supabase_url".to_string(),
            key_ref: "supabase_anon_key".to_string(),
            letters_table: "letters".to_string(),
            speeches_table: "speeches".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Reconciliation and listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Leading characters of the content used to find a record at send time
    pub prefix_chars: usize,

    /// Fall back to content-prefix search when no identifier is supplied
    pub content_prefix_fallback: bool,

    /// Default page size for recent listings
    pub default_list_limit: usize,

    /// Upper bound for recent listings
    pub max_list_limit: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            prefix_chars: 100,
            content_prefix_fallback: true,
            default_list_limit: 10,
            max_list_limit: 100,
        }
    }
}

impl LetterdeskConfig {
    /// Load configuration from an explicit path, the default location, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Default config file (~/.letterdesk/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".letterdesk").join("config.toml"))
    }

    /// Reject values that would make the service misbehave at runtime
    pub fn validate(&self) -> Result<()> {
        let r = &self.reconcile;
        if r.prefix_chars == 0 {
            return Err(Error::Config("reconcile.prefix_chars must be positive".to_string()));
        }
        if r.max_list_limit == 0 {
            return Err(Error::Config("reconcile.max_list_limit must be positive".to_string()));
        }
        if r.default_list_limit == 0 || r.default_list_limit > r.max_list_limit {
            return Err(Error::Config(format!(
                "reconcile.default_list_limit must be between 1 and {}",
                r.max_list_limit
            )));
        }
        if self.llm.model.trim().is_empty() {
            return Err(Error::Config("llm.model must not be empty".to_string()));
        }
        Ok(())
    }

    /// Resolve every credential from the process environment
    pub fn resolve_secrets(&self) -> Result<ResolvedSecrets> {
        self.resolve_secrets_with(|name| std::env::var(name).ok())
    }

    /// Resolve credentials through `lookup`, trying each ref as written and upper-cased.
    ///
    /// Fails with a single error naming every missing variable.
    pub fn resolve_secrets_with<F>(&self, lookup: F) -> Result<ResolvedSecrets>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut resolve = |name: &str| {
            let value = lookup(name)
                .or_else(|| lookup(&name.to_uppercase()))
                .filter(|v| !v.trim().is_empty());
            if value.is_none() {
                missing.push(name.to_uppercase());
            }
            value.map(Secret::new)
        };

        let llm_api_key = resolve(&self.llm.api_key_ref);
        let smtp_username = resolve(&self.smtp.username_ref);
        let smtp_password = resolve(&self.smtp.password_ref);
        let store = match self.store.backend {
            StoreBackend::Supabase => {
                let url = resolve(&self.store.url_ref);
                let key = resolve(&self.store.key_ref);
                url.zip(key)
            }
            StoreBackend::Memory => None,
        };

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing environment variables: {}",
                missing.join(", ")
            )));
        }

        match (llm_api_key, smtp_username, smtp_password) {
            (Some(llm_api_key), Some(smtp_username), Some(smtp_password)) => Ok(ResolvedSecrets {
                llm_api_key,
                smtp_username,
                smtp_password,
                store,
            }),
            _ => Err(Error::Internal("secret resolution inconsistent".to_string())),
        }
    }
}

/// Credentials resolved from the environment
#[derive(Debug, Clone)]
pub struct ResolvedSecrets {
    pub llm_api_key: Secret,
    pub smtp_username: Secret,
    pub smtp_password: Secret,
    /// Store URL and key; absent for the memory backend
    pub store: Option<(Secret, Secret)>,
}

/// A credential that is wiped on drop and never printed
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw value; keep the borrow short
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = LetterdeskConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.smtp.port, 465);
        assert_eq!(config.smtp.tls, SmtpTls::Implicit);
        assert_eq!(config.store.backend, StoreBackend::Supabase);
        assert_eq!(config.reconcile.prefix_chars, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: LetterdeskConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [store]
            backend = "memory"

            [smtp]
            tls = "starttls"
            port = 587
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.letters_table, "letters");
        assert_eq!(config.smtp.tls, SmtpTls::Starttls);
        assert_eq!(config.llm.max_tokens, 1500);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[reconcile]\nprefix_chars = 40\n").unwrap();

        let config = LetterdeskConfig::load(Some(&path)).unwrap();
        assert_eq!(config.reconcile.prefix_chars, 40);
    }

    #[test]
    fn test_load_rejects_invalid_limits() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[reconcile]\ndefault_list_limit = 50\nmax_list_limit = 20\n",
        )
        .unwrap();

        let err = LetterdeskConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_reports_bad_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = 1").unwrap();

        let err = LetterdeskConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_resolve_secrets_uppercase_fallback() {
        let vars = env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SMTP_USERNAME", "bot@example.com"),
            ("smtp_password", "hunter2"),
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]);
        let secrets = LetterdeskConfig::default()
            .resolve_secrets_with(|k| vars.get(k).cloned())
            .unwrap();

        assert_eq!(secrets.llm_api_key.expose(), "sk-test");
        assert_eq!(secrets.smtp_password.expose(), "hunter2");
        let (url, _) = secrets.store.unwrap();
        assert_eq!(url.expose(), "https://abc.supabase.co");
    }

    #[test]
    fn test_resolve_secrets_lists_all_missing() {
        let vars = env(&[("OPENAI_API_KEY", "sk-test"), ("SMTP_PASSWORD", "  ")]);
        let err = LetterdeskConfig::default()
            .resolve_secrets_with(|k| vars.get(k).cloned())
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("SMTP_USERNAME"));
        assert!(msg.contains("SMTP_PASSWORD"));
        assert!(msg.contains("SUPABASE_URL"));
        assert!(msg.contains("SUPABASE_ANON_KEY"));
        assert!(!msg.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_memory_backend_needs_no_store_secrets() {
        let mut config = LetterdeskConfig::default();
        config.store.backend = StoreBackend::Memory;
        let vars = env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SMTP_USERNAME", "bot@example.com"),
            ("SMTP_PASSWORD", "pw"),
        ]);

        let secrets = config.resolve_secrets_with(|k| vars.get(k).cloned()).unwrap();
        assert!(secrets.store.is_none());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::new("sk-very-secret");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("very-secret"));
    }
}
