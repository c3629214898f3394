//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coreport_core::error::CoreportError;
use serde_json::json;
use uuid::Uuid;

/// A `CoreportError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub CoreportError);

impl<E: Into<CoreportError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self(CoreportError::Validation {
            message: message.into(),
        })
    }

    pub fn forbidden<T: Into<String>>(reason: T) -> Self {
        Self(CoreportError::Forbidden {
            reason: reason.into(),
        })
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            CoreportError::NotFound { .. } => StatusCode::NOT_FOUND,
            CoreportError::Forbidden { .. } => StatusCode::FORBIDDEN,
            CoreportError::InvalidState { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            CoreportError::Conflict { .. } => StatusCode::CONFLICT,
            CoreportError::Validation { .. } => StatusCode::BAD_REQUEST,
            CoreportError::Database(_) | CoreportError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();
        let code = self.0.code();

        let message = match &self.0 {
            CoreportError::Database(err) | CoreportError::Internal(err) => {
                tracing::error!(error_id = %error_id, error = %err, code, "request failed");
                "Internal server error".to_string()
            }
            CoreportError::NotFound { .. } => {
                tracing::info!(error_id = %error_id, error = %self.0, "resource not found");
                self.0.to_string()
            }
            other => {
                tracing::warn!(error_id = %error_id, error = %other, code, "request rejected");
                other.to_string()
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
            "error_id": error_id,
        }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
