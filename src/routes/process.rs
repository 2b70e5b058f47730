//! Scan processing endpoint
//!
//! `POST /process` takes a multipart form:
//! - `pdf_file`: the source PDF (required)
//! - `placements`: JSON list of signature placements (default `[]`)
//! - `filter_type`: `color`, `gray` or `bw` (default `color`)
//! - `signature_file`: signature image (required when placements are given)
//!
//! and answers with the scanned PDF as an attachment.

use axum::{
    body::Body,
    extract::{multipart::Field, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::effects::EffectMode;
use crate::error::{ErrorResponse, ScanError};
use crate::scan::{self, ScanRequest};
use crate::state::AppState;

const OUTPUT_FILENAME: &str = "scan_result.pdf";
const ACCEPTED_PDF_TYPES: [&str; 2] = ["application/pdf", "application/octet-stream"];

/// Failures outside the pipeline itself
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to read upload: {0}")]
    Multipart(String),

    #[error("No PDF provided. Use field name 'pdf_file'")]
    MissingDocument,

    #[error("Unsupported PDF content type: {0}")]
    UnsupportedContentType(String),

    #[error("Scan worker failed: {0}")]
    Worker(String),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl ProcessError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ProcessError::Multipart(_) => (StatusCode::BAD_REQUEST, "invalid_upload"),
            ProcessError::MissingDocument => (StatusCode::BAD_REQUEST, "missing_document"),
            ProcessError::UnsupportedContentType(_) => {
                (StatusCode::BAD_REQUEST, "unsupported_content_type")
            }
            ProcessError::Worker(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ProcessError::Scan(err) => (err.status_code(), err.kind()),
        }
    }
}

impl IntoResponse for ProcessError {
    fn into_response(self) -> Response {
        // Pipeline errors carry their own message
        let this = match self {
            ProcessError::Scan(err) => return err.into_response(),
            other => other,
        };
        let (status, error) = this.status_and_kind();

        if status.is_server_error() {
            tracing::error!("Process request failed: {}", this);
        } else {
            tracing::debug!("Rejected upload: {}", this);
        }
        (status, Json(ErrorResponse::new(error, this.to_string()))).into_response()
    }
}

/// Run the scan pipeline on an uploaded PDF
pub async fn process_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ProcessError> {
    let request = read_request(multipart).await?;
    let options = state.scan_options();

    tracing::debug!(
        bytes = request.document.len(),
        mode = %request.mode,
        signature = request.signature.is_some(),
        "Received scan request"
    );

    // Rendering and effects are CPU-bound
    let output = tokio::task::spawn_blocking(move || scan::process_with_thread_rng(request, &options))
        .await
        .map_err(|e| ProcessError::Worker(e.to_string()))??;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", OUTPUT_FILENAME),
        )
        .body(Body::from(output))
        .map_err(|e| ProcessError::Worker(e.to_string()))
}

async fn read_request(mut multipart: Multipart) -> Result<ScanRequest, ProcessError> {
    let mut document = None;
    let mut placements = None;
    let mut mode = None;
    let mut signature = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ProcessError::Multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        tracing::trace!(
            "Received field: name='{}', filename={:?}, content_type={:?}",
            name,
            field.file_name(),
            field.content_type()
        );

        match name.as_str() {
            "pdf_file" => {
                check_pdf_content_type(&field)?;
                document = Some(read_bytes(field).await?);
            }
            "signature_file" => signature = Some(read_bytes(field).await?),
            "placements" => placements = Some(read_text(field).await?),
            "filter_type" => mode = Some(EffectMode::parse(&read_text(field).await?)),
            _ => tracing::debug!("Ignoring unknown field '{}'", name),
        }
    }

    let document = document.ok_or(ProcessError::MissingDocument)?;
    Ok(ScanRequest {
        document,
        mode: mode.unwrap_or_default(),
        placements: placements.unwrap_or_else(|| "[]".to_string()),
        signature,
    })
}

fn check_pdf_content_type(field: &Field<'_>) -> Result<(), ProcessError> {
    let content_type = field.content_type();
    if is_pdf_content_type(content_type) {
        Ok(())
    } else {
        Err(ProcessError::UnsupportedContentType(
            content_type.unwrap_or("none").to_string(),
        ))
    }
}

/// Only an explicit PDF or generic binary type is accepted
fn is_pdf_content_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    ACCEPTED_PDF_TYPES.contains(&essence.as_str())
}

async fn read_bytes(field: Field<'_>) -> Result<Vec<u8>, ProcessError> {
    field
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|e| ProcessError::Multipart(e.to_string()))
}

async fn read_text(field: Field<'_>) -> Result<String, ProcessError> {
    field
        .text()
        .await
        .map_err(|e| ProcessError::Multipart(e.to_string()))
}
