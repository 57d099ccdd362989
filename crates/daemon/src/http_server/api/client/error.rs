use reqwest::StatusCode;

use crate::http_server::api::document::DocumentResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The service answered with its own failure envelope.
    #[error("{} ({status}): {}", .response.message, .response.error)]
    Service {
        status: StatusCode,
        response: DocumentResponse,
    },

    #[error("HTTP {0}: {1}")]
    HttpStatus(StatusCode, String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Service { status, .. } | ApiError::HttpStatus(status, _) => Some(*status),
            ApiError::Reqwest(e) => e.status(),
            ApiError::Url(_) => None,
        }
    }
}
