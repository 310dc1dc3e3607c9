use tracing::warn;

pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP relay settings and the mailbox that receives submissions.
///
/// Loading never fails. A value that is missing here only becomes an error
/// on the request that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    /// Implicit TLS. When false the connection starts in plaintext and is
    /// upgraded with STARTTLS if the server offers it.
    pub smtp_secure: bool,
    /// Login name, also used as the From address.
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub recipient_email: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_secure: false,
            smtp_username: None,
            smtp_password: None,
            recipient_email: None,
        }
    }
}

impl EmailConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup, using the same variable names as
    /// [`EmailConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let smtp_port = match non_empty("SMTP_PORT") {
            Some(raw) => leading_port(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "SMTP_PORT is not a valid port, using {DEFAULT_SMTP_PORT}");
                DEFAULT_SMTP_PORT
            }),
            None => DEFAULT_SMTP_PORT,
        };

        Self {
            smtp_host: non_empty("SMTP_HOST"),
            smtp_port,
            smtp_secure: lookup("SMTP_SECURE").as_deref() == Some("true"),
            smtp_username: non_empty("EMAIL_USER"),
            smtp_password: non_empty("EMAIL_PASS"),
            recipient_email: non_empty("RECIPIENT_EMAIL"),
        }
    }

    /// Names of the variables a working relay needs but that are unset.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.smtp_host.is_none() {
            missing.push("SMTP_HOST");
        }
        if self.smtp_username.is_none() {
            missing.push("EMAIL_USER");
        }
        if self.smtp_password.is_none() {
            missing.push("EMAIL_PASS");
        }
        if self.recipient_email.is_none() {
            missing.push("RECIPIENT_EMAIL");
        }
        missing
    }
}

/// Reads the leading run of digits after any whitespace, so `"2525abc"`
/// yields 2525. Anything without leading digits, or out of range, is `None`.
fn leading_port(raw: &str) -> Option<u16> {
    let trimmed = raw.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}
