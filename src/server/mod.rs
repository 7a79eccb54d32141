// src/server/mod.rs
//! HTTP upload boundary.
//!
//! `POST /upload` takes a multipart form with a `file` field and answers with the
//! extracted sections as a flat JSON object. Validation happens here, before the
//! extraction pipeline is ever invoked.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use thiserror::Error;

use crate::acquisition::Document;
use crate::extractors::{ExtractionResult, SyllabusExtractor};
use crate::utils::error::{AcquisitionError, AppError, ValidationError};

const UPLOAD_FIELD: &str = "file";

// ============================================================================
// AppState / errors
// ============================================================================

#[derive(Clone)]
struct AppState {
    extractor: Arc<SyllabusExtractor>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error("extraction task failed: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Acquisition(e) => {
                tracing::error!("Failed to process upload: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process document".to_string())
            }
            ApiError::Internal(e) => {
                tracing::error!("Upload handler failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// A validated upload, not yet on disk.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

// ============================================================================
// Router
// ============================================================================

pub fn router(extractor: Arc<SyllabusExtractor>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/upload", post(upload_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(AppState { extractor })
}

pub async fn serve(bind: &str, extractor: Arc<SyllabusExtractor>, max_upload_bytes: usize) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| AppError::Server(format!("failed to bind to {}: {}", bind, e)))?;

    tracing::info!("Listening on {} (max upload {} bytes)", bind, max_upload_bytes);
    axum::serve(listener, router(extractor, max_upload_bytes))
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> &'static str {
    "ok"
}

async fn upload_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractionResult>, ApiError> {
    let upload = read_upload(multipart).await?;
    tracing::info!("Received '{}' ({} bytes)", upload.file_name, upload.bytes.len());

    let result = run_pipeline(state.extractor, upload).await?;
    Ok(Json(result))
}

/// Pulls the `file` field out of the form, rejecting missing or unnamed files.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, ValidationError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ValidationError::Malformed(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err(ValidationError::NoFileSelected);
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ValidationError::Malformed(e.body_text()))?;
        return Ok(Upload { file_name, bytes });
    }

    Err(ValidationError::NoFileProvided)
}

/// Runs the blocking pipeline off the async workers. The spawned task owns the
/// document, so its cleanup finishes even if the client goes away mid-request.
pub async fn run_pipeline(extractor: Arc<SyllabusExtractor>, upload: Upload) -> Result<ExtractionResult, ApiError> {
    let outcome = tokio::task::spawn_blocking(move || -> Result<ExtractionResult, AcquisitionError> {
        let document = Document::from_bytes(&upload.bytes, &upload.file_name)?;
        extractor.extract(document)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(outcome?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::fakes::{acquisition, FakeRasterizer, FakeRecognizer};
    use crate::extractors::SectionCatalog;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};

    const BOUNDARY: &str = "XSYLLABUSX";

    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(f) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                    name, f
                )),
                None => body.push_str(&format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap()
    }

    async fn parse(parts: &[(&str, Option<&str>, &str)]) -> Result<Upload, ValidationError> {
        let multipart = Multipart::from_request(multipart_request(parts), &()).await.unwrap();
        read_upload(multipart).await
    }

    fn extractor(native_text: &str, fail_ocr: bool) -> Arc<SyllabusExtractor> {
        let recognizer = FakeRecognizer { fail: fail_ocr, ..Default::default() };
        let acq = acquisition(native_text, 1, FakeRasterizer::default(), recognizer);
        Arc::new(SyllabusExtractor::new(&SectionCatalog::default(), acq).unwrap())
    }

    #[test]
    fn test_upload_with_file_is_accepted() {
        tokio_test::block_on(async {
            let upload = parse(&[("course", None, "cs101"), ("file", Some("syllabus.pdf"), "%PDF-1.4 body")])
                .await
                .unwrap();
            assert_eq!(upload.file_name, "syllabus.pdf");
            assert_eq!(&upload.bytes[..], b"%PDF-1.4 body");
        });
    }

    #[test]
    fn test_missing_file_field_is_rejected() {
        tokio_test::block_on(async {
            let err = parse(&[("course", None, "cs101")]).await.unwrap_err();
            assert_eq!(err, ValidationError::NoFileProvided);
        });
    }

    #[test]
    fn test_empty_filename_is_rejected() {
        tokio_test::block_on(async {
            let err = parse(&[("file", Some(""), "")]).await.unwrap_err();
            assert_eq!(err, ValidationError::NoFileSelected);
        });
    }

    #[test]
    fn test_pipeline_returns_sections() {
        tokio_test::block_on(async {
            let upload = Upload {
                file_name: "s.pdf".to_string(),
                bytes: Bytes::from_static(b"%PDF-1.4"),
            };
            let result = run_pipeline(extractor("Grading Scale: A=90-100, B=80-89\nAttendance: mandatory", false), upload)
                .await
                .unwrap();
            assert_eq!(result.get("Grading Policy"), Some("A=90-100, B=80-89"));
        });
    }

    #[test]
    fn test_acquisition_failure_maps_to_generic_500() {
        tokio_test::block_on(async {
            let upload = Upload {
                file_name: "scan.pdf".to_string(),
                bytes: Bytes::from_static(b"%PDF-1.4"),
            };
            let err = run_pipeline(extractor("", true), upload).await.unwrap_err();
            assert!(matches!(err, ApiError::Acquisition(_)));

            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["error"], "Failed to process document");
        });
    }

    #[test]
    fn test_validation_errors_are_400() {
        let response = ApiError::from(ValidationError::NoFileSelected).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
