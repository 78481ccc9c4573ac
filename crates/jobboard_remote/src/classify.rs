//! Maps HTTP failures onto the shared error taxonomy.

use jobboard_core::{ConflictKind, ErrorKind, SyncError, CODE_ALREADY_APPLIED};
use reqwest::StatusCode;
use serde_json::{Map, Value};

/// Keys of the error body that carry the summary rather than field errors.
const SUMMARY_KEYS: [&str; 5] = ["code", "detail", "message", "Message", "success"];

pub fn classify_status(status: StatusCode, body: &[u8]) -> SyncError {
    let fields = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    let code = fields.get("code").and_then(Value::as_str).map(str::to_string);
    let message = summary_message(&fields).or_else(|| plain_text(body));
    let field_errors = field_errors(&fields);

    let mentions_already = message
        .as_deref()
        .is_some_and(|message| message.to_ascii_lowercase().contains("already"));

    let kind = if code.as_deref() == Some(CODE_ALREADY_APPLIED) || status == StatusCode::CONFLICT {
        ErrorKind::Conflict(ConflictKind::DuplicateResource)
    } else {
        match status {
            StatusCode::BAD_REQUEST if mentions_already => {
                ErrorKind::Conflict(ConflictKind::DuplicateResource)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Auth,
            StatusCode::NOT_FOUND => ErrorKind::NotFound,
            _ => ErrorKind::Unknown,
        }
    };

    let mut error = SyncError::new(kind).with_field_errors(field_errors);
    error.code = code;
    error.message = message.or_else(|| status.canonical_reason().map(str::to_string));
    error
}

pub fn map_reqwest_error(err: reqwest::Error) -> SyncError {
    let kind = if err.is_timeout() || err.is_connect() || err.is_request() {
        ErrorKind::Network
    } else {
        ErrorKind::Unknown
    };
    SyncError::new(kind).with_message(err.to_string())
}

fn summary_message(fields: &Map<String, Value>) -> Option<String> {
    ["message", "Message", "detail"]
        .into_iter()
        .filter_map(|key| fields.get(key))
        .find_map(|value| value.as_str().map(str::to_string))
        .filter(|message| !message.trim().is_empty())
}

/// Short non-JSON bodies are kept as the message; HTML error pages are not.
fn plain_text(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?.trim();
    if text.is_empty() || text.starts_with('<') || text.starts_with('{') || text.len() > 200 {
        return None;
    }
    Some(text.to_string())
}

/// Flattens `detail: [..]`, `non_field_errors` and serializer field maps
/// into `"field: message"` lines.
fn field_errors(fields: &Map<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(Value::Array(items)) = fields.get("detail") {
        errors.extend(items.iter().filter_map(text_of));
    }
    for (key, value) in fields {
        if SUMMARY_KEYS.contains(&key.as_str()) {
            continue;
        }
        let messages: Vec<String> = match value {
            Value::Array(items) => items.iter().filter_map(text_of).collect(),
            Value::String(text) => vec![text.clone()],
            Value::Object(nested) => nested
                .iter()
                .flat_map(|(inner, value)| {
                    collect_strings(value)
                        .into_iter()
                        .map(move |message| format!("{inner}: {message}"))
                })
                .collect(),
            _ => Vec::new(),
        };
        if key == "non_field_errors" {
            errors.extend(messages);
        } else {
            errors.extend(messages.into_iter().map(|message| format!("{key}: {message}")));
        }
    }
    errors
}

fn collect_strings(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text_of).collect(),
        Value::String(text) => vec![text.clone()],
        _ => Vec::new(),
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(status: u16, body: &str) -> SyncError {
        classify_status(StatusCode::from_u16(status).unwrap(), body.as_bytes())
    }

    #[test]
    fn already_applied_400_is_a_conflict() {
        let error = classify(400, r#"{"message": "You have already applied for this job."}"#);
        assert_eq!(error.kind, ErrorKind::Conflict(ConflictKind::DuplicateResource));
        assert!(error.message_contains("already applied"));
    }

    #[test]
    fn already_applied_code_is_a_conflict_regardless_of_status() {
        let error = classify(422, r#"{"code": "ALREADY_APPLIED"}"#);
        assert_eq!(error.kind, ErrorKind::Conflict(ConflictKind::DuplicateResource));
        assert!(error.has_code(CODE_ALREADY_APPLIED));
    }

    #[test]
    fn serializer_errors_become_field_errors() {
        let error = classify(
            400,
            r#"{"cover_letter_text": ["This field may not be blank."], "non_field_errors": ["Bad form."]}"#,
        );
        assert_eq!(error.kind, ErrorKind::Validation);
        assert_eq!(
            error.field_errors,
            vec![
                "cover_letter_text: This field may not be blank.".to_string(),
                "Bad form.".to_string(),
            ]
        );
    }

    #[test]
    fn detail_list_is_flattened() {
        let error = classify(400, r#"{"detail": ["first", "second"], "code": "JOB_CLOSED"}"#);
        assert_eq!(error.kind, ErrorKind::Validation);
        assert_eq!(error.field_errors, vec!["first".to_string(), "second".to_string()]);
        assert!(error.has_code("JOB_CLOSED"));
    }

    #[test]
    fn statuses_map_to_kinds() {
        assert_eq!(classify(401, "").kind, ErrorKind::Auth);
        assert_eq!(classify(403, r#"{"detail": "CSRF Failed"}"#).kind, ErrorKind::Auth);
        assert_eq!(classify(404, r#"{"detail": "This job is not saved."}"#).kind, ErrorKind::NotFound);
        assert_eq!(
            classify(409, "").kind,
            ErrorKind::Conflict(ConflictKind::DuplicateResource)
        );
        assert_eq!(classify(500, "<html>oops</html>").kind, ErrorKind::Unknown);
    }

    #[test]
    fn throttle_keeps_server_message() {
        let error = classify(429, r#"{"detail": "Request was throttled."}"#);
        assert_eq!(error.kind, ErrorKind::Unknown);
        assert_eq!(error.message.as_deref(), Some("Request was throttled."));
    }

    #[test]
    fn empty_body_falls_back_to_reason_phrase() {
        let error = classify(404, "");
        assert_eq!(error.message.as_deref(), Some("Not Found"));
    }
}
