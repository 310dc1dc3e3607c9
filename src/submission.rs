use serde::Deserialize;
use serde_json::Value;

/// Contact form body as it arrives. Fields stay untyped so any JSON value
/// can be judged the way a browser script would judge it.
#[derive(Debug, Default, Deserialize)]
pub struct RawSubmission {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub subject: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

/// A submission with all four fields present and rendered as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl RawSubmission {
    /// Returns `None` when any field is absent or falsy.
    pub fn validate(&self) -> Option<Submission> {
        Some(Submission {
            name: present(&self.name)?,
            email: present(&self.email)?,
            subject: present(&self.subject)?,
            message: present(&self.message)?,
        })
    }
}

fn present(field: &Option<Value>) -> Option<String> {
    field
        .as_ref()
        .filter(|value| is_truthy(value))
        .map(display_text)
}

/// `null`, `false`, zero and the empty string are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // Whole floats print without a fraction: `1.0` renders as `1`.
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(|f| f.to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}
