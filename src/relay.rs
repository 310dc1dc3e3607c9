use axum::http::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::email_config::EmailConfig;
use crate::error::RelayError;
use crate::mailer::Mailer;
use crate::message::OutgoingMail;
use crate::submission::RawSubmission;

pub const SUCCESS_MESSAGE: &str = "Email sent successfully!";

/// Turns one contact form request into one email.
///
/// Cheap to clone; every clone shares the same settings and mailer.
#[derive(Clone)]
pub struct ContactRelay {
    config: Arc<EmailConfig>,
    mailer: Arc<dyn Mailer>,
}

impl ContactRelay {
    pub fn new(config: EmailConfig, mailer: Arc<dyn Mailer>) -> Self {
        ContactRelay {
            config: Arc::new(config),
            mailer,
        }
    }

    /// Runs a request through method check, parsing, validation and
    /// delivery, stopping at the first failure. Failures are logged here.
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    pub async fn handle(&self, method: &Method, body: &[u8]) -> Result<(), RelayError> {
        self.relay(method, body).await.inspect_err(|e| e.log())
    }

    async fn relay(&self, method: &Method, body: &[u8]) -> Result<(), RelayError> {
        if method != Method::POST {
            return Err(RelayError::MethodNotAllowed(method.to_string()));
        }

        let raw = parse_body(body)?;
        let submission = raw.validate().ok_or(RelayError::MissingFields)?;

        let from = self.config.smtp_username.as_deref().ok_or_else(|| {
            RelayError::TransportConfig("EMAIL_USER is not configured".to_string())
        })?;
        let to = self.config.recipient_email.as_deref().ok_or_else(|| {
            RelayError::TransportConfig("RECIPIENT_EMAIL is not configured".to_string())
        })?;

        let mail = OutgoingMail::compose(&submission, from, to);
        self.mailer.send(&mail).await?;

        info!(to, subject = %mail.subject, "Email sent");
        Ok(())
    }
}

fn parse_body(body: &[u8]) -> Result<RawSubmission, RelayError> {
    let value: Value = serde_json::from_slice(body)?;
    match value {
        Value::Object(fields) => Ok(serde_json::from_value(Value::Object(fields))?),
        Value::Null => Err(RelayError::Parse(serde::de::Error::custom(
            "cannot read form fields from null",
        ))),
        // Arrays and scalars carry no named fields.
        _ => Ok(RawSubmission::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::testing::RecordingMailer;
    use crate::mailer::MailerError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const ADA: &str =
        r#"{"name":"Ada","email":"ada@example.com","subject":"Hello","message":"Hi there"}"#;

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_host: Some("smtp.example.com".to_string()),
            smtp_username: Some("site@example.com".to_string()),
            smtp_password: Some("hunter2".to_string()),
            recipient_email: Some("owner@example.com".to_string()),
            ..EmailConfig::default()
        }
    }

    fn relay_with(mailer: RecordingMailer) -> (ContactRelay, Arc<RecordingMailer>) {
        let mailer = Arc::new(mailer);
        (ContactRelay::new(config(), mailer.clone()), mailer)
    }

    #[tokio::test]
    async fn test_sends_complete_submission() {
        let (relay, mailer) = relay_with(RecordingMailer::default());

        relay.handle(&Method::POST, ADA.as_bytes()).await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "site@example.com");
        assert_eq!(sent[0].to, "owner@example.com");
        assert_eq!(sent[0].subject, "New Contact Form Submission: Hello");
        for value in ["Ada", "ada@example.com", "Hello", "Hi there"] {
            assert!(sent[0].html_body.contains(value), "body lacks {value}");
        }
    }

    #[tokio::test]
    async fn test_non_post_never_reaches_mailer() {
        let (relay, mailer) = relay_with(RecordingMailer::default());

        for method in [
            Method::GET,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::HEAD,
            Method::OPTIONS,
        ] {
            let err = relay.handle(&method, ADA.as_bytes()).await.unwrap_err();
            assert!(matches!(err, RelayError::MethodNotAllowed(_)));
        }
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_missing_fields_never_reach_mailer() {
        let (relay, mailer) = relay_with(RecordingMailer::default());

        for body in [
            json!({}),
            json!({"name": "Ada", "email": "ada@example.com", "subject": "Hello"}),
            json!({"name": "", "email": "ada@example.com", "subject": "Hello", "message": "Hi"}),
            json!({"name": "Ada", "email": null, "subject": "Hello", "message": "Hi"}),
            json!({"name": "Ada", "email": "ada@example.com", "subject": 0, "message": "Hi"}),
            json!({"name": "Ada", "email": "ada@example.com", "subject": "Hello", "message": false}),
        ] {
            let err = relay
                .handle(&Method::POST, body.to_string().as_bytes())
                .await
                .unwrap_err();
            assert!(matches!(err, RelayError::MissingFields), "{body}");
        }
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let (relay, mailer) = relay_with(RecordingMailer::default());

        for body in ["", "{", "name=Ada", "null"] {
            let err = relay
                .handle(&Method::POST, body.as_bytes())
                .await
                .unwrap_err();
            assert!(matches!(err, RelayError::Parse(_)), "{body:?}");
        }
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_json_without_fields_is_missing_fields() {
        let (relay, mailer) = relay_with(RecordingMailer::default());

        for body in ["[1, 2, 3, 4]", "\"Ada\"", "42", "true", "[]"] {
            let err = relay
                .handle(&Method::POST, body.as_bytes())
                .await
                .unwrap_err();
            assert!(matches!(err, RelayError::MissingFields), "{body:?}");
        }
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_carries_description() {
        let (relay, mailer) = relay_with(RecordingMailer::failing(MailerError::Send(
            "Connection refused".to_string(),
        )));

        let err = relay.handle(&Method::POST, ADA.as_bytes()).await.unwrap_err();

        assert!(matches!(&err, RelayError::Send(d) if d == "Connection refused"));
        assert_eq!(err.to_string(), "Connection refused");
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_mailer_config_failure_is_transport_config_error() {
        let (relay, _) = relay_with(RecordingMailer::failing(MailerError::Config(
            "SMTP_HOST is not configured".to_string(),
        )));

        let err = relay.handle(&Method::POST, ADA.as_bytes()).await.unwrap_err();
        assert!(matches!(err, RelayError::TransportConfig(_)));
    }

    #[tokio::test]
    async fn test_missing_sender_or_recipient_is_transport_config_error() {
        let mailer = Arc::new(RecordingMailer::default());

        let no_sender = ContactRelay::new(
            EmailConfig {
                smtp_username: None,
                ..config()
            },
            mailer.clone(),
        );
        let err = no_sender.handle(&Method::POST, ADA.as_bytes()).await.unwrap_err();
        assert_eq!(err.to_string(), "EMAIL_USER is not configured");

        let no_recipient = ContactRelay::new(
            EmailConfig {
                recipient_email: None,
                ..config()
            },
            mailer.clone(),
        );
        let err = no_recipient
            .handle(&Method::POST, ADA.as_bytes())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "RECIPIENT_EMAIL is not configured");

        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_requests_send_again() {
        let (relay, mailer) = relay_with(RecordingMailer::default());

        relay.handle(&Method::POST, ADA.as_bytes()).await.unwrap();
        relay.handle(&Method::POST, ADA.as_bytes()).await.unwrap();

        assert_eq!(mailer.sent().len(), 2);
    }
}
