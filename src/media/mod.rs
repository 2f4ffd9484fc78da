//! Media upload data model
//!
//! Response and error payloads of the `media/upload.json` endpoint.

pub mod forms;
pub mod service;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Response to INIT and FINALIZE
///
/// ```json
/// {
///   "media_id": 710511363345354753,
///   "media_id_string": "710511363345354753",
///   "size": 11065,
///   "expires_after_secs": 86400
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResponse {
    #[serde(default)]
    pub media_id: u64,

    #[serde(default)]
    pub media_id_string: String,

    #[serde(default)]
    pub size: u64,

    #[serde(default)]
    pub expires_after_secs: u64,
}

impl MediaResponse {
    /// Media id to pass to APPEND and FINALIZE
    ///
    /// Prefers the string form; falls back to the numeric id when the string is absent.
    pub fn id(&self) -> String {
        if self.media_id_string.is_empty() {
            self.media_id.to_string()
        } else {
            self.media_id_string.clone()
        }
    }
}

/// Error payload returned by the API on failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

/// A single entry of an [`ApiError`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: i64,

    #[serde(default)]
    pub message: String,
}

impl ApiError {
    /// True when the API reported no errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.first() {
            Some(detail) => write!(f, "twitter: {} {}", detail.code, detail.message),
            None => Ok(()),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_response_decode() {
        let body = r#"{
            "media_id": 710511363345354753,
            "media_id_string": "710511363345354753",
            "size": 11065,
            "expires_after_secs": 86400,
            "image": {"image_type": "image/jpeg", "w": 800, "h": 320}
        }"#;

        let response: MediaResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.media_id, 710511363345354753);
        assert_eq!(response.media_id_string, "710511363345354753");
        assert_eq!(response.size, 11065);
        assert_eq!(response.expires_after_secs, 86400);
    }

    #[test]
    fn test_media_response_missing_fields() {
        let response: MediaResponse =
            serde_json::from_str(r#"{"media_id": 42, "media_id_string": "42"}"#).unwrap();
        assert_eq!(response.size, 0);
        assert_eq!(response.expires_after_secs, 0);
        assert_eq!(response.id(), "42");
    }

    #[test]
    fn test_media_response_id_fallback() {
        let response = MediaResponse {
            media_id: 7,
            ..Default::default()
        };
        assert_eq!(response.id(), "7");
    }

    #[test]
    fn test_api_error_display() {
        let err: ApiError = serde_json::from_str(
            r#"{"errors": [{"code": 324, "message": "Invalid media"}, {"code": 1, "message": "x"}]}"#,
        )
        .unwrap();
        assert!(!err.is_empty());
        assert_eq!(err.to_string(), "twitter: 324 Invalid media");
    }

    #[test]
    fn test_default_api_error_is_empty() {
        let err = ApiError::default();
        assert!(err.is_empty());
        assert_eq!(err.to_string(), "");
    }
}
