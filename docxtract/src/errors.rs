use crate::extract::ExtractError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Request used a method other than the one the route serves
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Invalid upload: oversized, malformed, missing field or disallowed type
    #[error("{message}")]
    BadRequest { message: String },

    /// Extraction capacity exhausted
    #[error("{message}")]
    TooManyRequests { message: String },

    /// Staging file could not be created or written
    #[error("Failed to stage upload: {0}")]
    Staging(#[source] std::io::Error),

    /// The document package could not be opened, or its body could not be parsed
    #[error(transparent)]
    Extraction(#[from] ExtractError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            Error::Staging(_) | Error::Extraction(_) | Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the plain-text body sent to the client.
    ///
    /// Parser failures are passed through verbatim so callers can tell a corrupt package from
    /// an unsupported one; every other internal failure is reduced to a fixed message.
    pub fn user_message(&self) -> String {
        match self {
            Error::MethodNotAllowed => "Method not allowed".to_string(),
            Error::BadRequest { message } | Error::TooManyRequests { message } => message.clone(),
            Error::Staging(_) => "Error processing file".to_string(),
            Error::Extraction(err) if err.is_open_failure() => format!("Error opening document: {err}"),
            Error::Extraction(err) => format!("Error extracting content: {err}"),
            Error::Internal { .. } => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Staging(_) | Error::Extraction(_) | Error::Internal { .. } => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::TooManyRequests { .. } => {
                tracing::info!("Capacity error: {}", self);
            }
            Error::MethodNotAllowed | Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for handler results
pub type Result<T> = std::result::Result<T, Error>;
