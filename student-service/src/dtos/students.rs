use serde::Deserialize;

/// Incoming student body, used both for create and for partial update.
///
/// Every field is optional at this layer so that a missing field is reported
/// by validation with its name rather than as a generic JSON error.
#[derive(Debug, Default, Deserialize)]
pub struct StudentPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    pub gpa: Option<GpaValue>,
}

/// GPA as sent by clients: a JSON number or a numeric string such as `"3.0"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GpaValue {
    Number(f64),
    Text(String),
}

impl GpaValue {
    /// Finite numeric value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            GpaValue::Number(n) => Some(*n),
            GpaValue::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }
}
