//! Error responses for the pets API
//!
//! Every failure leaves the handlers as an [`ApiError`]; this is the only
//! place that decides status codes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kennel_usecase::PetServiceError;
use serde::Serialize;
use tracing::{error, warn};

use super::validation::FieldErrors;

/// `{"detail": "..."}` body used for everything but field errors
#[derive(Debug, Serialize)]
pub struct Detail {
    pub detail: String,
}

/// Application-level error that converts into an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// 400 with per-field messages
    Validation(FieldErrors),
    /// The body could not be read as JSON
    Rejected { status: StatusCode, detail: String },
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn not_found() -> Self {
        ApiError::NotFound("Not found.".to_string())
    }

    pub fn invalid_page() -> Self {
        ApiError::NotFound("Invalid page.".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected { status, .. } => *status,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(errors) => (status, Json(errors)).into_response(),
            ApiError::Rejected { detail, .. } | ApiError::NotFound(detail) => {
                (status, Json(Detail { detail })).into_response()
            }
            ApiError::Internal(detail) => {
                error!(%detail, "request failed");
                (status, Json(Detail { detail })).into_response()
            }
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(status = %rejection.status(), "unreadable request body");
        let detail = match &rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Unsupported media type in request. Expected \"application/json\".".to_string()
            }
            other => format!("JSON parse error - {}", other.body_text()),
        };
        ApiError::Rejected {
            status: rejection.status(),
            detail,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        warn!(status = %rejection.status(), "unreadable query string");
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<PetServiceError> for ApiError {
    fn from(err: PetServiceError) -> Self {
        match err {
            PetServiceError::PetNotFound(_) => ApiError::not_found(),
            PetServiceError::InvalidPage(_) => ApiError::invalid_page(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
