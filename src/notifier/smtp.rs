//! SMTP notifier built on lettre's async transport

use super::{template, DeliveryMetadata, Notifier};
use crate::artifact::EmailAddress;
use crate::config::{Secret, SmtpConfig, SmtpTls};
use crate::error::{DeliveryError, Error, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

/// Sends artifacts as multipart/alternative emails
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    relay: String,
}

impl SmtpNotifier {
    /// Build the transport; the SMTP username doubles as the From address
    pub fn new(config: &SmtpConfig, username: Secret, password: Secret) -> Result<Self> {
        let address: Address = username.expose().parse().map_err(|e| {
            Error::Config(format!("SMTP username is not an email address: {}", e))
        })?;
        let from = Mailbox::new(Some(config.from_name.clone()), address);

        let builder = match config.tls {
            SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host),
            SmtpTls::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host),
            SmtpTls::None => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                &config.host,
            )),
        }
        .map_err(|e| Error::Config(format!("invalid SMTP relay {}: {}", config.host, e)))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                username.expose().to_string(),
                password.expose().to_string(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        tracing::debug!(
            host = %config.host,
            port = config.port,
            tls = ?config.tls,
            "SMTP transport ready"
        );
        Ok(Self {
            transport,
            from,
            relay: format!("{}:{}", config.host, config.port),
        })
    }

    fn build_message(
        &self,
        destination: &EmailAddress,
        text: &str,
        metadata: &DeliveryMetadata,
    ) -> std::result::Result<Message, DeliveryError> {
        build_message(self.from.clone(), destination, text, metadata)
    }
}

fn build_message(
    from: Mailbox,
    destination: &EmailAddress,
    text: &str,
    metadata: &DeliveryMetadata,
) -> std::result::Result<Message, DeliveryError> {
    let to: Address = destination
        .as_str()
        .parse()
        .map_err(|e| DeliveryError::RecipientRejected(format!("{}: {}", destination, e)))?;
    let to = Mailbox::new(metadata.recipient_name.clone(), to);

    let generated_at = chrono::Local::now().to_rfc2822();
    let plain = template::text_body(text, metadata, &generated_at);
    let html = template::html_body(text, metadata, &generated_at);

    Message::builder()
        .from(from)
        .to(to)
        .subject(metadata.email_subject())
        .date_now()
        .multipart(MultiPart::alternative_plain_html(plain, html))
        .map_err(|e| DeliveryError::Other(format!("failed to build message: {}", e)))
}

/// Map a three-digit SMTP reply code to a specific failure, if it has one
fn classify_code(code: &str, detail: &str) -> Option<DeliveryError> {
    match code {
        "530" | "534" | "535" => Some(DeliveryError::Auth),
        "550" | "551" | "553" => Some(DeliveryError::RecipientRejected(detail.to_string())),
        _ => None,
    }
}

fn classify(error: &lettre::transport::smtp::Error) -> DeliveryError {
    if let Some(code) = error.status() {
        if let Some(mapped) = classify_code(&code.to_string(), &error.to_string()) {
            return mapped;
        }
    }
    if error.is_timeout() {
        return DeliveryError::Disconnected(error.to_string());
    }

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return DeliveryError::Disconnected(error.to_string());
        }
        source = cause.source();
    }

    DeliveryError::Other(error.to_string())
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(
        &self,
        destination: &EmailAddress,
        text: &str,
        metadata: &DeliveryMetadata,
    ) -> std::result::Result<(), DeliveryError> {
        let message = self.build_message(destination, text, metadata)?;

        match self.transport.send(message).await {
            Ok(_) => {
                tracing::info!(kind = %metadata.kind, to = %destination, "Email sent");
                Ok(())
            }
            Err(e) => {
                let err = classify(&e);
                tracing::error!(
                    kind = %metadata.kind,
                    to = %destination,
                    error = %err,
                    "Email delivery failed"
                );
                Err(err)
            }
        }
    }

    fn transport_name(&self) -> &str {
        &self.relay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from() -> Mailbox {
        Mailbox::new(
            Some("Letterdesk".to_string()),
            "bot@example.com".parse().unwrap(),
        )
    }

    #[test]
    fn test_build_message_headers() {
        let to: EmailAddress = "jean@example.fr".parse().unwrap();
        let meta = DeliveryMetadata::letter("Appointment", "formal", "Jean", "Paul Martin");
        let message = build_message(from(), &to, "Dear Sir,", &meta).unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Your letter - Appointment"));
        assert!(raw.contains("jean@example.fr"));
        assert!(raw.contains("bot@example.com"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn test_classify_code() {
        assert_eq!(classify_code("535", "bad creds"), Some(DeliveryError::Auth));
        assert_eq!(
            classify_code("550", "no such user"),
            Some(DeliveryError::RecipientRejected("no such user".to_string()))
        );
        assert_eq!(classify_code("421", "try later"), None);
    }

    #[test]
    fn test_new_rejects_non_address_username() {
        let result = SmtpNotifier::new(
            &SmtpConfig::default(),
            Secret::new("not an address"),
            Secret::new("pw"),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_new_accepts_valid_config() {
        let notifier = SmtpNotifier::new(
            &SmtpConfig::default(),
            Secret::new("bot@example.com"),
            Secret::new("pw"),
        )
        .unwrap();
        assert_eq!(notifier.transport_name(), "mail.infomaniak.com:465");
    }

    #[tokio::test]
    async fn test_send_to_closed_port_is_disconnect_or_other() {
        let config = SmtpConfig {
            host: "127.0.0.1".to_string(),
            port: 9,
            tls: SmtpTls::None,
            timeout_secs: 2,
            ..Default::default()
        };
        let notifier =
            SmtpNotifier::new(&config, Secret::new("bot@example.com"), Secret::new("pw")).unwrap();
        let to: EmailAddress = "guest@example.com".parse().unwrap();

        let err = notifier
            .send(&to, "Chers amis", &DeliveryMetadata::speech())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::Disconnected(_) | DeliveryError::Other(_)
        ));
    }
}
