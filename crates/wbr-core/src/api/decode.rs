//! Decode raw response bodies into typed payloads.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Longest body excerpt shown in error messages.
const BODY_SNIPPET_CHARS: usize = 512;

/// A response body that did not match the expected payload.
#[derive(Debug, Error)]
#[error("malformed {what} response: {source}; body: {}", snippet(.body))]
pub struct DecodeError {
    /// Which payload was expected.
    pub what: &'static str,
    /// The raw body (lossy UTF-8).
    pub body: String,
    #[source]
    pub source: serde_json::Error,
}

/// Decode `body` as `T`. Status codes are the caller's concern.
pub fn decode<T: DeserializeOwned>(what: &'static str, body: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(body).map_err(|source| DecodeError {
        what,
        body: String::from_utf8_lossy(body).into_owned(),
        source,
    })
}

/// Body text truncated for display.
pub(crate) fn snippet(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= BODY_SNIPPET_CHARS {
        return body.to_string();
    }
    let cut: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AvailabilityResponse, SaveResponse};

    #[test]
    fn html_body_is_malformed_and_echoed() {
        let body = b"<html><body>Service Unavailable</body></html>";
        let err = decode::<AvailabilityResponse>("availability", body).unwrap_err();
        assert_eq!(err.what, "availability");
        assert!(err.body.contains("Service Unavailable"));
        assert!(err.to_string().starts_with("malformed availability response"));
        assert!(err.to_string().contains("Service Unavailable"));
    }

    #[test]
    fn wrong_field_type_is_malformed() {
        let body = br#"{"url": "x", "job_id": 42, "message": ""}"#;
        assert!(decode::<SaveResponse>("save", body).is_err());
    }

    #[test]
    fn long_bodies_are_truncated_in_display() {
        let body = "x".repeat(2000);
        let s = snippet(&body);
        assert_eq!(s.len(), BODY_SNIPPET_CHARS + 3);
        assert!(s.ends_with("..."));
    }
}
