use reqwest::StatusCode;
use serde_json::Value;

use crate::models::response::ErrorInfo;

/// Turn a non-success HTTP response body into an [`ErrorInfo`].
///
/// GoTrue and PostgREST disagree on key names (`msg`, `message`,
/// `error_description`, `error`), so every known spelling is tried before
/// falling back to the raw body or the status line.
pub fn error_info_from_response(status: StatusCode, body: &str) -> ErrorInfo {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let field = |keys: &[&str]| -> Option<String> {
        let object = parsed.as_ref()?.as_object()?;
        keys.iter().find_map(|key| match object.get(*key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    };

    let message = field(&["message", "msg", "error_description", "error"])
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && parsed.is_none()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("error")
            )
        });

    let mut info = ErrorInfo::new(message);
    info.code = field(&["code", "error_code"]).or_else(|| Some(status.as_u16().to_string()));
    info.details = field(&["details"]);
    info.hint = field(&["hint"]);
    info
}
