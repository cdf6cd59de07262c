use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("request to hosted service failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success response from the hosted service; the upstream message is
    /// preserved for passthrough.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("record not found")]
    NotFound,

    #[error("invalid hosted service url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Pull a human-readable message out of an upstream error body.
///
/// The hosted services are inconsistent about the field name, so try the
/// known spellings in order.
pub(crate) fn upstream_message(body: &Value) -> String {
    for key in ["message", "msg", "error_description", "error", "hint"] {
        if let Some(text) = body.get(key).and_then(Value::as_str) {
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }
    "upstream request failed".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_message_field() {
        let body = json!({"message": "duplicate key", "hint": "ignored"});
        assert_eq!(upstream_message(&body), "duplicate key");
    }

    #[test]
    fn falls_back_through_known_spellings() {
        assert_eq!(
            upstream_message(&json!({"msg": "User already registered"})),
            "User already registered"
        );
        assert_eq!(
            upstream_message(&json!({"error_description": "bad grant"})),
            "bad grant"
        );
        assert_eq!(upstream_message(&json!({})), "upstream request failed");
    }
}
