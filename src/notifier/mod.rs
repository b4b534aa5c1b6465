//! Outbound delivery of generated artifacts
//!
//! [`Notifier`] is the seam used by the orchestrator; [`SmtpNotifier`] sends
//! multipart emails through an SMTP relay.

pub mod smtp;
pub mod template;

pub use smtp::SmtpNotifier;

use crate::artifact::{ArtifactKind, EmailAddress};
use crate::error::DeliveryError;
use async_trait::async_trait;

/// Context rendered alongside the artifact text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryMetadata {
    pub kind: ArtifactKind,
    pub subject: Option<String>,
    pub tone: Option<String>,
    pub sender_name: Option<String>,
    pub recipient_name: Option<String>,
}

impl DeliveryMetadata {
    pub fn letter(
        subject: impl Into<String>,
        tone: impl Into<String>,
        sender_name: impl Into<String>,
        recipient_name: impl Into<String>,
    ) -> Self {
        Self {
            kind: ArtifactKind::Letter,
            subject: Some(subject.into()),
            tone: Some(tone.into()),
            sender_name: Some(sender_name.into()),
            recipient_name: Some(recipient_name.into()),
        }
    }

    pub fn speech() -> Self {
        Self {
            kind: ArtifactKind::Speech,
            subject: None,
            tone: None,
            sender_name: None,
            recipient_name: None,
        }
    }

    /// Subject line of the outgoing email
    pub fn email_subject(&self) -> String {
        match (self.kind, self.subject.as_deref().map(str::trim)) {
            (ArtifactKind::Letter, Some(subject)) if !subject.is_empty() => {
                format!("Your letter - {}", subject)
            }
            (ArtifactKind::Letter, _) => "Your letter".to_string(),
            (ArtifactKind::Speech, _) => "Your wedding speech".to_string(),
        }
    }
}

/// Delivers text to a destination address
#[async_trait]
pub trait Notifier: Send + Sync {
    /// One delivery attempt; calling twice sends twice
    async fn send(
        &self,
        destination: &EmailAddress,
        text: &str,
        metadata: &DeliveryMetadata,
    ) -> Result<(), DeliveryError>;

    /// Where mail is handed off, as reported by `/health`
    fn transport_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_subject() {
        let meta = DeliveryMetadata::letter("Résiliation", "formal", "Jean", "Orange");
        assert_eq!(meta.email_subject(), "Your letter - Résiliation");

        let meta = DeliveryMetadata::letter("  ", "formal", "Jean", "Orange");
        assert_eq!(meta.email_subject(), "Your letter");

        assert_eq!(DeliveryMetadata::speech().email_subject(), "Your wedding speech");
    }
}
