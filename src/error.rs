//! HTTP-facing error type.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::inference::InferenceError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body, bad path segment, or a flag outside {0,1}.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Inference(String),

    #[error("Not Found")]
    NotFound,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}

impl From<InferenceError> for ApiError {
    fn from(e: InferenceError) -> Self {
        ApiError::Inference(e.to_string())
    }
}
