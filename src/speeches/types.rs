//! Wedding speech wire types

use crate::artifact::EmailAddress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for POST /generate-speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Who gives the speech
    #[serde(alias = "prenom")]
    pub speaker_name: String,
    /// The person getting married
    #[serde(alias = "marie")]
    pub person1: String,
    /// Their partner
    #[serde(alias = "partenaire")]
    pub person2: String,
    /// Speaker's relationship to the couple
    #[serde(alias = "lien")]
    pub relationship: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default, alias = "qualites")]
    pub qualities: Option<String>,
    #[serde(default)]
    pub anecdotes: Option<String>,
    #[serde(default, alias = "souvenir")]
    pub memory: Option<String>,
    #[serde(default, alias = "rencontre")]
    pub how_they_met: Option<String>,
    #[serde(default, alias = "duree")]
    pub duration: Option<String>,
}

impl SpeechRequest {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        let required = [
            ("speaker_name", &self.speaker_name),
            ("person1", &self.person1),
            ("person2", &self.person2),
            ("relationship", &self.relationship),
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
            speaker_name: "Lucie".to_string(),
            person1: "Camille".to_string(),
            person2: "Hugo".to_string(),
            relationship: "best friend".to_string(),
            style: Some("humorous".to_string()),
            qualities: Some("generous, stubborn".to_string()),
            anecdotes: None,
            memory: Some("the road trip to Porto".to_string()),
            how_they_met: Some("at a climbing gym".to_string()),
            duration: Some("3 minutes".to_string()),
        }
    }
}

/// Response body for POST /generate-speech
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeechResponse {
    pub speech: String,
    pub speech_id: Option<Uuid>,
}

/// Request body for POST /send-speech
#[derive(Debug, Clone, Deserialize)]
pub struct SendSpeechRequest {
    pub email: EmailAddress,
    #[serde(alias = "discours", alias = "content")]
    pub speech: String,
    #[serde(default)]
    pub speech_id: Option<Uuid>,
}

/// Response body for POST /send-speech
#[derive(Debug, Serialize, Deserialize)]
pub struct SendSpeechResponse {
    /// "success" once the email has been handed to the relay
    pub status: String,
    pub message: String,
}

/// Response body for GET /speech/:id
#[derive(Debug, Serialize, Deserialize)]
pub struct GetSpeechResponse {
    pub speech: String,
    pub created_at: DateTime<Utc>,
}
