//! Twitter Media - client for the chunked media upload endpoint
//!
//! Uploads go through three calls against `media/upload.json`:
//! INIT declares the payload size and returns a media id, APPEND sends one
//! segment per call, FINALIZE closes the upload. Sequencing and chunking are
//! up to the caller.

pub mod config;
pub mod media;

pub use config::{Config, ConfigBuilder};
pub use media::forms::{AppendForm, AppendPayload, Command, FinalizeForm, Form, InitForm};
pub use media::service::{relevant_error, AppendResponse, MediaService};
pub use media::{ApiError, ErrorDetail, MediaResponse};

/// Result type for media upload operations
pub type Result<T> = std::result::Result<T, MediaError>;

/// Error types for media upload operations
#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Api(ApiError),

    #[error("unexpected status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<ApiError> for MediaError {
    fn from(err: ApiError) -> Self {
        MediaError::Api(err)
    }
}
