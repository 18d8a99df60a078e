//! Error payloads returned by the API

use serde_json::Value;

/// Code the API uses to signal an expired access token.
pub const TOKEN_EXPIRED_CODE: &str = "TOKEN_EXPIRED";

/// Alternative spellings of the expiry marker seen in the wild.
const EXPIRY_ALIASES: &[&str] = &["token_expired", "jwt expired", "token expired"];

/// Normalised view of an error response body.
///
/// The API is not consistent about where it puts the code: both
/// `{"code": ..., "message": ...}` and `{"error": {"code": ..., "message": ...}}`
/// are accepted, as is `{"error": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    /// Machine-readable code.
    pub code: Option<String>,
    /// Server-provided human message.
    pub message: Option<String>,
    /// Field-level validation messages, flattened.
    pub field_errors: Vec<String>,
}

impl ErrorBody {
    /// Builds the normalised view from an arbitrary JSON payload.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let nested = value.get("error").filter(|e| e.is_object());
        let code = string_field(value, "code").or_else(|| nested.and_then(|e| string_field(e, "code")));
        let message = string_field(value, "message")
            .or_else(|| nested.and_then(|e| string_field(e, "message")))
            .or_else(|| string_field(value, "error"));
        let field_errors = value
            .get("errors")
            .or_else(|| nested.and_then(|e| e.get("errors")))
            .map(flatten_field_errors)
            .unwrap_or_default();

        Self {
            code,
            message,
            field_errors,
        }
    }

    /// Returns true if the payload carries the expired-token marker.
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        let matches_marker = |text: &str| {
            text.eq_ignore_ascii_case(TOKEN_EXPIRED_CODE)
                || EXPIRY_ALIASES.iter().any(|alias| text.eq_ignore_ascii_case(alias))
        };
        self.code.as_deref().is_some_and(matches_marker)
            || self.message.as_deref().is_some_and(matches_marker)
    }

    /// Field errors joined into a single display string.
    #[must_use]
    pub fn joined_field_errors(&self) -> Option<String> {
        if self.field_errors.is_empty() {
            None
        } else {
            Some(self.field_errors.join("; "))
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(String::from)
}

/// Accepts `["msg"]`, `[{"field": "f", "message": "msg"}]`, `[{"msg": "..."}]`
/// and `{"field": "msg" | ["msg", ...]}`.
fn flatten_field_errors(errors: &Value) -> Vec<String> {
    match errors {
        Value::Array(items) => items.iter().filter_map(item_message).collect(),
        Value::Object(map) => map
            .iter()
            .flat_map(|(field, messages)| match messages {
                Value::Array(list) => list
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|m| format!("{field}: {m}"))
                    .collect::<Vec<_>>(),
                Value::String(m) => vec![format!("{field}: {m}")],
                _ => Vec::new(),
            })
            .collect(),
        Value::String(m) => vec![m.clone()],
        _ => Vec::new(),
    }
}

fn item_message(item: &Value) -> Option<String> {
    match item {
        Value::String(m) => Some(m.clone()),
        Value::Object(_) => {
            let message = string_field(item, "message").or_else(|| string_field(item, "msg"))?;
            let field = string_field(item, "field")
                .or_else(|| string_field(item, "path"))
                .or_else(|| string_field(item, "param"));
            Some(match field {
                Some(field) => format!("{field}: {message}"),
                None => message,
            })
        }
        _ => None,
    }
}
