use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Error body carried inside an [`Envelope`].
///
/// Field names follow the PostgREST/GoTrue error payloads so remote errors can
/// be forwarded unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
            hint: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ErrorInfo {}

/// The `{data, error}` shape returned by every adapter-level call.
///
/// Callers check `error` instead of matching on a `Result`; on failure `data`
/// holds the "empty" shape of the payload (nulls, not garbage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    pub error: Option<ErrorInfo>,
}

impl<T> Envelope<T> {
    /// Successful envelope
    pub fn ok(data: T) -> Self {
        Self { data, error: None }
    }

    /// Failed envelope with an explicit data shape
    pub fn with_error(data: T, error: ErrorInfo) -> Self {
        Self {
            data,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// Message of the carried error, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    pub fn into_result(self) -> Result<T, ErrorInfo> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}

impl<T: Default> Envelope<T> {
    /// Failed envelope with the default (empty) data shape
    pub fn failure(error: ErrorInfo) -> Self {
        Self::with_error(T::default(), error)
    }
}

impl Envelope<Value> {
    /// Decode the JSON payload into a concrete type.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ErrorInfo> {
        let data = self.into_result()?;
        serde_json::from_value(data).map_err(|e| {
            ErrorInfo::new(format!("Failed to decode response: {}", e)).with_code("serialization")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_uses_empty_shape() {
        let envelope: Envelope<Value> = Envelope::failure(ErrorInfo::new("boom"));
        assert_eq!(envelope.data, Value::Null);
        assert_eq!(envelope.error_message(), Some("boom"));
    }

    #[test]
    fn test_serializes_to_data_error_shape() {
        let envelope = Envelope::ok(json!({"id": 1}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({"data": {"id": 1}, "error": null}));
    }

    #[test]
    fn test_decode_reports_shape_mismatch() {
        let envelope = Envelope::ok(json!("not a number"));
        let err = envelope.decode::<u32>().unwrap_err();
        assert_eq!(err.code.as_deref(), Some("serialization"));
    }
}
