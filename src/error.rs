//! Failure cases of the contact relay and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::mailer::MailerError;

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed. Only POST requests are accepted.";
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required form fields.";
pub const SEND_FAILED_MESSAGE: &str = "Failed to send email.";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Missing required form fields")]
    MissingFields,

    #[error("{0}")]
    Body(String),

    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    TransportConfig(String),

    #[error("{0}")]
    Send(String),
}

impl From<MailerError> for RelayError {
    fn from(err: MailerError) -> Self {
        match err {
            MailerError::Config(detail) => RelayError::TransportConfig(detail),
            MailerError::Send(detail) => RelayError::Send(detail),
        }
    }
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MissingFields => StatusCode::BAD_REQUEST,
            RelayError::Body(_)
            | RelayError::Parse(_)
            | RelayError::TransportConfig(_)
            | RelayError::Send(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Writes the failure to the log at a level matching who is at fault.
    pub fn log(&self) {
        match self {
            RelayError::MethodNotAllowed(method) => {
                tracing::debug!(%method, "Rejected non-POST request");
            }
            RelayError::MissingFields => {
                tracing::warn!("Rejected submission with missing fields");
            }
            RelayError::Body(detail) => {
                tracing::error!(error = %detail, "Error reading request body");
            }
            RelayError::Parse(e) => {
                tracing::error!(error = %e, "Error parsing request body");
            }
            RelayError::TransportConfig(detail) => {
                tracing::error!(error = %detail, "Error configuring SMTP transport");
            }
            RelayError::Send(detail) => {
                tracing::error!(error = %detail, "Error sending email");
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            RelayError::MethodNotAllowed(_) => json!({ "message": METHOD_NOT_ALLOWED_MESSAGE }),
            RelayError::MissingFields => json!({ "message": MISSING_FIELDS_MESSAGE }),
            RelayError::Body(_)
            | RelayError::Parse(_)
            | RelayError::TransportConfig(_)
            | RelayError::Send(_) => json!({
                "message": SEND_FAILED_MESSAGE,
                "error": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
