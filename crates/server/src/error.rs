//! Error responses for the HTTP API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    MissingFields(String),

    #[error("{0}")]
    InvalidFields(String),

    #[error("{0}")]
    ModelNotLoaded(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Endpoint not found")]
    NotFound,
}

impl ApiError {
    /// Label used for the prediction error counter
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::MissingFields(_) => "missing_fields",
            ApiError::InvalidFields(_) => "invalid_fields",
            ApiError::ModelNotLoaded(_) => "model_not_loaded",
            ApiError::Internal(_) => "internal",
            ApiError::NotFound => "not_found",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidRequest(msg)
            | ApiError::MissingFields(msg)
            | ApiError::InvalidFields(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ModelNotLoaded(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string()),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Endpoint not found".to_string()),
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
