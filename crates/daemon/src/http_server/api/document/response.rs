use std::fmt::Display;

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use store::{Document, DocumentError};

/// Non-standard status returned when a generated key collides with an
/// existing document.
pub const FILE_EXISTS_STATUS: u16 = 515;

/// The JSON envelope every document endpoint answers with.
///
/// `ok` goes over the wire as the string `"true"` / `"false"`; empty fields
/// are left out.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DocumentResponse {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    /// Document body, as text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub document: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extractor: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub creation_date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub modification_date: String,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

impl DocumentResponse {
    pub fn success(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            key: key.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn failure(
        key: impl Into<String>,
        message: impl Into<String>,
        error: &dyn Display,
    ) -> Self {
        Self {
            ok: false,
            key: key.into(),
            message: message.into(),
            error: error.to_string(),
            ..Self::default()
        }
    }

    pub fn from_document(doc: Document) -> Self {
        let meta = doc.metadata;
        Self {
            ok: true,
            key: doc.key,
            document: String::from_utf8_lossy(&doc.content).into_owned(),
            timestamp: meta.timestamp,
            name: meta.name,
            content_type: meta.content_type,
            extractor: meta.extractor,
            title: meta.title,
            creation_date: meta.creation_date,
            modification_date: meta.modification_date,
            ..Self::default()
        }
    }
}

pub(crate) fn file_exists_status() -> StatusCode {
    StatusCode::from_u16(FILE_EXISTS_STATUS).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub(crate) fn respond(status: StatusCode, body: DocumentResponse) -> Response {
    (status, Json(body)).into_response()
}

/// Client mistakes at debug, storage failures at warn.
pub(crate) fn log_failure(operation: &'static str, key: &str, err: &DocumentError) {
    match err {
        DocumentError::NotFound(_)
        | DocumentError::Conflict(_)
        | DocumentError::EmptyInput
        | DocumentError::InvalidKey(_) => {
            tracing::debug!(operation, key, error = %err, "request rejected")
        }
        _ if err.leaves_orphan() => {
            tracing::warn!(operation, key, error = %err, "document left half-written")
        }
        _ => tracing::warn!(operation, key, error = %err, "storage failure"),
    }
}
