//! Scan pipeline error types
//!
//! Every failure is request-level: the pipeline aborts and no partial
//! document is returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Unified pipeline error type
#[derive(Debug, Error)]
pub enum ScanError {
    /// Signature bytes could not be decoded as an image
    #[error("Invalid signature image: {0}")]
    InvalidSignatureImage(String),

    /// A placement record failed validation
    #[error("Invalid placement: {0}")]
    InvalidPlacement(#[from] PlacementError),

    /// The placement payload is not a JSON list of records
    #[error("Malformed placement list: {0}")]
    MalformedPlacementList(String),

    /// Placements were supplied without a signature image
    #[error("A signature image is required when placements are supplied")]
    MissingSignatureImage,

    /// The document byte stream is empty
    #[error("Empty PDF document")]
    EmptyDocument,

    /// Document could not be parsed, or a page failed to render
    #[error("Document decode error: {0}")]
    DocumentDecode(String),

    /// Output document or embedded image could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),
}

/// Distinguishable causes of an invalid placement
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("placement {index}: missing field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("placement {index}: field '{field}' is not numeric")]
    NotNumeric { index: usize, field: &'static str },

    #[error("page index {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: i64, page_count: usize },

    #[error("field '{field}' = {value} is outside its allowed range")]
    ValueOutOfRange { field: &'static str, value: f64 },
}

/// Result type alias for pipeline operations
pub type ScanResult<T> = std::result::Result<T, ScanError>;

impl From<mupdf::Error> for ScanError {
    fn from(err: mupdf::Error) -> Self {
        ScanError::DocumentDecode(err.to_string())
    }
}

impl From<lopdf::Error> for ScanError {
    fn from(err: lopdf::Error) -> Self {
        ScanError::DocumentDecode(err.to_string())
    }
}

impl ScanError {
    /// Machine-readable error kind used in HTTP responses
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::InvalidSignatureImage(_) => "invalid_signature_image",
            ScanError::InvalidPlacement(_) => "invalid_placement",
            ScanError::MalformedPlacementList(_) => "malformed_placement_list",
            ScanError::MissingSignatureImage => "missing_signature_image",
            ScanError::EmptyDocument => "empty_document",
            ScanError::DocumentDecode(_) => "document_decode_error",
            ScanError::Encode(_) => "encode_error",
        }
    }

    /// HTTP status for the error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScanError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Caller-facing message
    fn user_message(&self) -> String {
        match self {
            ScanError::InvalidSignatureImage(_) => "Failed to load the signature image".to_string(),
            ScanError::InvalidPlacement(PlacementError::PageOutOfRange { .. }) => {
                "Invalid page number for signature".to_string()
            }
            ScanError::InvalidPlacement(PlacementError::ValueOutOfRange { .. }) => {
                "Signature position and size must be within 0..1".to_string()
            }
            ScanError::InvalidPlacement(_) => "Invalid signature parameters".to_string(),
            ScanError::MalformedPlacementList(_) => "Invalid signature placement data".to_string(),
            ScanError::MissingSignatureImage => {
                "Upload a signature image to place signatures".to_string()
            }
            ScanError::EmptyDocument => "Empty PDF document".to_string(),
            ScanError::DocumentDecode(_) => "Failed to read the PDF document".to_string(),
            ScanError::Encode(_) => "An internal error occurred".to_string(),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Scan failed: {}", self);
        } else {
            tracing::debug!("Rejected scan request: {}", self);
        }

        let mut body = ErrorResponse::new(self.kind(), self.user_message());
        if cfg!(debug_assertions) || !status.is_server_error() {
            body = body.with_details(self.to_string());
        }

        (status, Json(body)).into_response()
    }
}
