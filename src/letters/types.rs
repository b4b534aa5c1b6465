//! Letter wire types
//!
//! Field names are snake_case. The French names used by the first frontend
//! (`nom`, `objet`, `ton`, ...) are accepted as aliases.

use crate::artifact::{Artifact, DraftRequest, EmailAddress};
use crate::orchestrator::MatchedBy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Letter tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[serde(alias = "formel")]
    Formal,
    #[serde(alias = "neutre")]
    Neutral,
    #[serde(alias = "concis")]
    Concise,
}

impl Tone {
    /// Style instruction handed to the model
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Formal => {
                "Use a very formal and respectful tone, with the appropriate courtesy formulas."
            }
            Self::Neutral => {
                "Use a neutral, professional tone, balanced between formal and relaxed."
            }
            Self::Concise => "Be concise and direct; get to the point without embellishment.",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Formal => write!(f, "formal"),
            Self::Neutral => write!(f, "neutral"),
            Self::Concise => write!(f, "concise"),
        }
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "formal" | "formel" => Ok(Self::Formal),
            "neutral" | "neutre" => Ok(Self::Neutral),
            "concise" | "concis" => Ok(Self::Concise),
            other => Err(format!("unknown tone: {}", other)),
        }
    }
}

/// Request body for POST /generate-letter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetterRequest {
    #[serde(alias = "nom")]
    pub sender_name: String,
    #[serde(alias = "adresse")]
    pub sender_address: String,
    #[serde(alias = "destinataire")]
    pub recipient_name: String,
    #[serde(default, alias = "adresse_destinataire")]
    pub recipient_address: Option<String>,
    #[serde(alias = "objet")]
    pub subject: String,
    #[serde(alias = "contexte")]
    pub context: String,
    #[serde(default, alias = "date_effet")]
    pub effective_date: Option<String>,
    #[serde(alias = "ton")]
    pub tone: Tone,
}

impl LetterRequest {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        let required = [
            ("sender_name", &self.sender_name),
            ("sender_address", &self.sender_address),
            ("recipient_name", &self.recipient_name),
            ("subject", &self.subject),
            ("context", &self.context),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                issues.push(format!("{} is empty", field));
            }
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    #[cfg(test)]
    pub(crate) fn sample() -> Self {
        Self {
            sender_name: "Jean Dupont".to_string(),
            sender_address: "123 Rue de la Paix, 75001 Paris".to_string(),
            recipient_name: "Monsieur Martin".to_string(),
            recipient_address: Some("456 Avenue des Champs, 75008 Paris".to_string()),
            subject: "Demande de rendez-vous".to_string(),
            context: "Je souhaite prendre rendez-vous pour discuter d'un projet.".to_string(),
            effective_date: Some("2024-01-15".to_string()),
            tone: Tone::Formal,
        }
    }
}

/// Response body for POST /generate-letter
#[derive(Debug, Serialize, Deserialize)]
pub struct LetterResponse {
    pub content: String,
    pub message: String,
    pub letter_id: Option<Uuid>,
}

/// Request body for POST /send-email
#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailRequest {
    #[serde(alias = "lettre")]
    pub content: String,
    pub email: EmailAddress,
    #[serde(alias = "objet")]
    pub subject: String,
    #[serde(alias = "ton")]
    pub tone: Tone,
    #[serde(alias = "nom")]
    pub sender_name: String,
    #[serde(alias = "destinataire")]
    pub recipient_name: String,
    #[serde(default)]
    pub letter_id: Option<Uuid>,
}

impl SendEmailRequest {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        let required = [
            ("content", &self.content),
            ("subject", &self.subject),
            ("sender_name", &self.sender_name),
            ("recipient_name", &self.recipient_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                issues.push(format!("{} is empty", field));
            }
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// Response body for POST /send-email
#[derive(Debug, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub email_sent: bool,
    pub message: String,
    /// The record whose delivery status was updated, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_id: Option<Uuid>,
    /// How that record was found; `content_prefix` is a heuristic match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<MatchedBy>,
}

/// A stored letter as returned by the read endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterView {
    pub id: Uuid,
    pub sender_name: String,
    pub sender_address: String,
    pub recipient_name: String,
    pub recipient_address: Option<String>,
    pub subject: String,
    pub context: String,
    pub effective_date: Option<String>,
    pub tone: Tone,
    pub content: String,
    pub destination_email: Option<String>,
    pub email_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LetterView {
    /// Flatten a letter artifact; speeches yield `None`
    pub fn from_artifact(artifact: Artifact) -> Option<Self> {
        let request = match artifact.request {
            DraftRequest::Letter(request) => request,
            DraftRequest::Speech(_) => return None,
        };
        Some(Self {
            id: artifact.id,
            sender_name: request.sender_name,
            sender_address: request.sender_address,
            recipient_name: request.recipient_name,
            recipient_address: request.recipient_address,
            subject: request.subject,
            context: request.context,
            effective_date: request.effective_date,
            tone: request.tone,
            content: artifact.content,
            destination_email: artifact.delivery.destination_email,
            email_sent: artifact.delivery.email_sent,
            created_at: artifact.created_at,
            updated_at: artifact.updated_at,
        })
    }
}

/// Query string for GET /letters
#[derive(Debug, Deserialize)]
pub struct ListLettersQuery {
    pub limit: Option<i64>,
}

/// Response body for letter listings
#[derive(Debug, Serialize, Deserialize)]
pub struct LetterListResponse {
    pub letters: Vec<LetterView>,
    pub count: usize,
    pub message: String,
}

/// Response body for GET /letters/:id
#[derive(Debug, Serialize, Deserialize)]
pub struct LetterDetailResponse {
    pub letter: LetterView,
    pub message: String,
}
