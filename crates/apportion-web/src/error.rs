//! Error handling for the web surface
//!
//! Every failure a handler can hit maps to one status code and a JSON body.
//! HTML pages render their own notices and only fall back to this type for
//! failures that leave nothing sensible to show.

use apportion_calculator::{AllocationError, RegistryError};
use apportion_io::{ExportError, IngestionError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum WebError {
    /// Malformed form or query input (400 Bad Request)
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Upload could not be ingested (400 Bad Request)
    #[error("Ingestion error: {0}")]
    Ingestion(#[from] IngestionError),

    /// Fixed income rejected by the registry (400 Bad Request)
    #[error("Invalid fixed income: {0}")]
    Registry(#[from] RegistryError),

    /// Nothing to allocate for the selected salesperson (422 Unprocessable Entity)
    #[error("{0}")]
    NotAllocatable(#[from] AllocationError),

    /// Export could not be produced (500 Internal Server Error)
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Template failed to render (500 Internal Server Error)
    #[error("Rendering error: {0}")]
    Render(#[from] askama::Error),
}

impl WebError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::Validation { .. } => StatusCode::BAD_REQUEST,
            WebError::Ingestion(_) => StatusCode::BAD_REQUEST,
            WebError::Registry(_) => StatusCode::BAD_REQUEST,
            WebError::NotAllocatable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WebError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            WebError::Validation { .. } => "VALIDATION_ERROR",
            WebError::Ingestion(_) => "INGESTION_ERROR",
            WebError::Registry(_) => "INVALID_FIXED_INCOME",
            WebError::NotAllocatable(_) => "NOT_ALLOCATABLE",
            WebError::Export(_) => "EXPORT_ERROR",
            WebError::Render(_) => "RENDER_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let field = match self {
            WebError::Validation { field, .. } => field.clone(),
            _ => None,
        };
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            field,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(self.to_response())).into_response()
    }
}

pub type WebResult<T> = Result<T, WebError>;
