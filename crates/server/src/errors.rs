use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use service::articles::ArticleError;
use service::StoreError;

/// HTTP-facing error. Every variant renders as an error envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("missing required fields")]
    Validation { required_fields: Vec<&'static str> },
    #[error("article not found")]
    NotFound { id: String },
    #[error("duplicated codebar")]
    DuplicateCodebar { codebar: String },
    /// Raw store message, passed through to the client.
    #[error("{0}")]
    Internal(String),
}

/// `{message:"error", statusCode, error, ...context}`
#[derive(Serialize, Debug)]
pub struct ErrorEnvelope {
    pub message: &'static str,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_fields: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicated_codebar: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::DuplicateCodebar { .. } => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn envelope(self) -> ErrorEnvelope {
        let status_code = self.status().as_u16();
        let error = self.to_string();
        let mut env = ErrorEnvelope {
            message: "error",
            status_code,
            error,
            required_fields: None,
            id: None,
            duplicated_codebar: None,
        };
        match self {
            ApiError::Validation { required_fields } => env.required_fields = Some(required_fields),
            ApiError::NotFound { id } => env.id = Some(id),
            ApiError::DuplicateCodebar { codebar } => env.duplicated_codebar = Some(codebar),
            ApiError::MethodNotAllowed | ApiError::Internal(_) => {}
        }
        env
    }
}

impl From<ArticleError> for ApiError {
    fn from(e: ArticleError) -> Self {
        match e {
            ArticleError::Validation { required_fields } => ApiError::Validation { required_fields },
            ArticleError::NotFound { id } => ApiError::NotFound { id },
            ArticleError::DuplicateCodebar { codebar } => ApiError::DuplicateCodebar { codebar },
            ArticleError::Store(e) => ApiError::from(e),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(self.envelope())).into_response()
    }
}
