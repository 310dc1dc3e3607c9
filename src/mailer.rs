use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::debug;

use crate::email_config::EmailConfig;
use crate::message::OutgoingMail;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailerError {
    /// The transport or the message could not be built from the settings.
    #[error("{0}")]
    Config(String),

    /// The SMTP exchange failed.
    #[error("{0}")]
    Send(String),
}

/// Delivers a composed email. Implementations must not retry.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailerError>;
}

/// Sends through an SMTP relay. A fresh connection is opened for every
/// message and closed once the server has answered.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        SmtpMailer { config }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailerError> {
        let host = self
            .config
            .smtp_host
            .as_deref()
            .ok_or_else(|| MailerError::Config("SMTP_HOST is not configured".to_string()))?;

        let tls_parameters = TlsParameters::new(host.to_string())
            .map_err(|e| MailerError::Config(format!("Invalid TLS settings for {host}: {e}")))?;
        let tls = if self.config.smtp_secure {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(self.config.smtp_port)
            .tls(tls);

        if let (Some(user), Some(pass)) = (&self.config.smtp_username, &self.config.smtp_password)
        {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(builder.build())
    }
}

pub fn build_message(mail: &OutgoingMail) -> Result<Message, MailerError> {
    let from: Mailbox = mail
        .from
        .parse()
        .map_err(|e| MailerError::Config(format!("Invalid sender address {:?}: {e}", mail.from)))?;
    let to: Mailbox = mail
        .to
        .parse()
        .map_err(|e| MailerError::Config(format!("Invalid recipient address {:?}: {e}", mail.to)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(mail.html_body.clone())
        .map_err(|e| MailerError::Config(format!("Error building message: {e}")))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailerError> {
        let message = build_message(mail)?;
        let transport = self.transport()?;

        debug!(
            host = self.config.smtp_host.as_deref().unwrap_or_default(),
            port = self.config.smtp_port,
            secure = self.config.smtp_secure,
            "Sending message over SMTP"
        );

        transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| MailerError::Send(e.to_string()))
    }
}
