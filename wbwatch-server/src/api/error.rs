//! HTTP error responses
//!
//! The two expected user-facing failures (not found, already subscribed)
//! keep specific status detail; everything else degrades to a generic
//! server error so internal detail never leaks to the caller.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;
use wbwatch_common::Error;

/// API error taxonomy mapped onto HTTP statuses
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    AlreadyExists(String),
    BadRequest(String),
    Unauthorized(String),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::AlreadyExists(msg) => ApiError::AlreadyExists(msg),
            Error::Auth(msg) => ApiError::Unauthorized(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::AlreadyExists(msg) | ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Unauthorized(msg) => {
                let body = Json(json!({ "detail": msg, "status_code": 401 }));
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    body,
                )
                    .into_response();
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Ошибка сервера".to_string())
            }
        };

        let body = Json(json!({ "detail": detail, "status_code": status.as_u16() }));
        (status, body).into_response()
    }
}
