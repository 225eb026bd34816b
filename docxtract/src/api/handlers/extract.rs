use crate::AppState;
use crate::api::models::extract::ExtractResponse;
use crate::errors::{Error, Result};
use crate::staging::StagedDocument;
use axum::{
    Json,
    extract::{
        State,
        multipart::{Field, Multipart, MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use tracing::{debug, info, instrument, warn};

/// Multipart field carrying the document
pub const DOCUMENT_FIELD: &str = "document";

fn retrieval_error() -> Error {
    Error::BadRequest {
        message: "Error retrieving file".to_string(),
    }
}

/// Map a multipart stream failure to a client error, telling an oversized body apart from a
/// malformed one.
fn multipart_error(err: MultipartError) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::BadRequest {
            message: "File too large".to_string(),
        }
    } else {
        debug!(error = %err.body_text(), "Malformed multipart body");
        retrieval_error()
    }
}

/// Extract the content of an uploaded Word document.
///
/// Expects `multipart/form-data` with the document in the `document` field. Other fields are
/// skipped; only the first `document` field is used.
#[instrument(skip_all)]
pub async fn extract_document(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!(error = %rejection, "Request is not a multipart upload");
        retrieval_error()
    })?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(DOCUMENT_FIELD) {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let content = extract_field(&state, field).await?;
        return Ok(Json(ExtractResponse { content }));
    }

    Err(retrieval_error())
}

/// Validate, stage and extract a single `document` field.
async fn extract_field(state: &AppState, mut field: Field<'_>) -> Result<String> {
    // Only the declared part header is trusted; the bytes are not sniffed
    let content_type = field.content_type().map(str::to_owned);
    let allowed = content_type
        .as_deref()
        .is_some_and(|declared| state.config.allowed_content_types.iter().any(|allowed| allowed == declared));
    if !allowed {
        debug!(content_type = ?content_type, "Rejecting upload with disallowed content type");
        return Err(Error::BadRequest {
            message: "Invalid file type. Only Word documents are allowed".to_string(),
        });
    }

    let _permit = match &state.limiters.extractions {
        Some(limiter) => Some(limiter.acquire().await?),
        None => None,
    };

    let mut staged = StagedDocument::create(&state.config.staging).map_err(Error::Staging)?;

    // The part arrives in arbitrarily sized chunks; keep reading until the stream ends
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        staged.write_chunk(&chunk).map_err(Error::Staging)?;
    }
    staged.finish().map_err(Error::Staging)?;

    info!(
        strategy = %state.extractor.kind(),
        file_name = ?field.file_name(),
        content_type = ?content_type,
        bytes = staged.len(),
        staged_path = %staged.path().display(),
        "Staged uploaded document"
    );

    let extractor = state.extractor.clone();
    let content = tokio::task::spawn_blocking(move || {
        let result = extractor.extract(staged.path());
        if let Err(e) = staged.close() {
            warn!(error = %e, "Failed to remove staged document");
        }
        result
    })
    .await
    .map_err(|e| Error::Internal {
        operation: format!("join extraction task: {e}"),
    })??;

    debug!(chars = content.len(), "Extracted document content");
    Ok(content)
}

/// Fallback for every method other than POST on `/extract`
pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}
