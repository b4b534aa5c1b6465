//! Artifacts: generated letters and speeches with their provenance
//!
//! An artifact's content and provenance are fixed when it is created. Only
//! the delivery status changes afterwards.

use crate::error::{Error, Result};
use crate::letters::types::LetterRequest;
use crate::speeches::types::SpeechRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Artifact kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Letter,
    Speech,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Letter => write!(f, "letter"),
            Self::Speech => write!(f, "speech"),
        }
    }
}

/// The structured input an artifact was drafted from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftRequest {
    Letter(LetterRequest),
    Speech(SpeechRequest),
}

impl DraftRequest {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Letter(_) => ArtifactKind::Letter,
            Self::Speech(_) => ArtifactKind::Speech,
        }
    }

    /// Check required fields; collects every problem instead of stopping at the first
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        match self {
            Self::Letter(req) => req.validate(),
            Self::Speech(req) => req.validate(),
        }
    }
}

/// Whether the artifact has been emailed, and where to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStatus {
    pub email_sent: bool,
    pub destination_email: Option<String>,
}

/// A stored artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    pub content: String,
    pub request: DraftRequest,
    pub delivery: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        self.request.kind()
    }

    /// Case-insensitive starts-with match used for send-time reconciliation.
    ///
    /// Folds one character at a time, so a cut prefix lowercases exactly like
    /// the same characters inside the content (no final-sigma context rule).
    pub fn content_starts_with(&self, prefix: &str) -> bool {
        let mut content = self.content.chars().flat_map(char::to_lowercase);
        prefix
            .chars()
            .flat_map(char::to_lowercase)
            .all(|p| content.next() == Some(p))
    }
}

/// An artifact that has been generated but not yet stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtifact {
    pub content: String,
    pub request: DraftRequest,
}

impl NewArtifact {
    pub fn kind(&self) -> ArtifactKind {
        self.request.kind()
    }
}

/// The first `chars` characters of `content`, cut on a character boundary
pub fn content_prefix(content: &str, chars: usize) -> &str {
    match content.char_indices().nth(chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// A syntactically valid email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for EmailAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        lettre::Address::from_str(trimmed)
            .map(|_| Self(trimmed.to_string()))
            .map_err(|e| Error::Validation(format!("invalid email address '{}': {}", trimmed, e)))
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A positive, capped page size for recent listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimit(usize);

impl ListLimit {
    /// Validate a caller-supplied limit: must be at least 1; values above `max` are capped
    pub fn new(requested: i64, max: usize) -> Result<Self> {
        if requested < 1 {
            return Err(Error::Validation(format!(
                "limit must be a positive integer, got {}",
                requested
            )));
        }
        let requested = usize::try_from(requested).unwrap_or(usize::MAX);
        Ok(Self(requested.min(max.max(1))))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_prefix_counts_characters() {
        assert_eq!(content_prefix("Madame, Monsieur", 6), "Madame");
        assert_eq!(content_prefix("Chère Élodie", 7), "Chère É");
        assert_eq!(content_prefix("short", 100), "short");
        assert_eq!(content_prefix("", 10), "");
    }

    #[test]
    fn test_email_address_validation() {
        let addr: EmailAddress = " jean.dupont@example.fr ".parse().unwrap();
        assert_eq!(addr.as_str(), "jean.dupont@example.fr");

        assert!("not-an-email".parse::<EmailAddress>().is_err());
        assert!("".parse::<EmailAddress>().is_err());
        assert!("a@".parse::<EmailAddress>().is_err());
    }

    #[test]
    fn test_email_address_deserialize() {
        let ok: std::result::Result<EmailAddress, _> = serde_json::from_str("\"a@b.co\"");
        assert!(ok.is_ok());
        let bad: std::result::Result<EmailAddress, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_list_limit_bounds() {
        assert_eq!(ListLimit::new(10, 100).unwrap().get(), 10);
        assert_eq!(ListLimit::new(5000, 100).unwrap().get(), 100);
        assert!(ListLimit::new(0, 100).is_err());
        assert!(ListLimit::new(-3, 100).is_err());
    }

    #[test]
    fn test_content_starts_with_ignores_case() {
        let artifact = Artifact {
            id: Uuid::new_v4(),
            content: "Dear Sir, following up".to_string(),
            request: DraftRequest::Speech(SpeechRequest::sample()),
            delivery: DeliveryStatus::default(),
            created_at: Utc::now(),
            updated_at: None,
        };
        assert!(artifact.content_starts_with("dear sir"));
        assert!(artifact.content_starts_with("DEAR SIR, FOLLOW"));
        assert!(!artifact.content_starts_with("Dear Madam"));
        assert_eq!(artifact.kind(), ArtifactKind::Speech);
    }
}
