pub mod email_config;
pub mod error;
pub mod mailer;
pub mod message;
pub mod relay;
pub mod server;
pub mod submission;

pub use email_config::EmailConfig;
pub use error::RelayError;
pub use mailer::{Mailer, MailerError, SmtpMailer};
pub use message::OutgoingMail;
pub use relay::ContactRelay;
pub use server::{router, ServerConfig};
