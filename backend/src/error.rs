use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

use crate::services::github::GitHubError;
use crate::services::store::StoreError;

/// Application-level error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed request (bad URL, bad body)
    Validation(String),
    /// Not found error
    NotFound(String),
    /// Conflict error (e.g., repository already added)
    Conflict(String),
    /// Authentication error
    Unauthorized(String),
    /// Upstream API failure
    Upstream(String),
    /// Internal server error
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
    meta: ErrorMeta,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Serialize)]
struct ErrorMeta {
    request_id: String,
}

impl AppError {
    /// Wrap an upstream failure with the message shown to clients
    pub fn upstream(what: &str, err: GitHubError) -> Self {
        tracing::warn!("{what}: {err}");
        match err {
            GitHubError::Status { status: 404, .. } => Self::NotFound(what.to_string()),
            GitHubError::InvalidPath(reason) => Self::Validation(reason),
            _ => Self::Upstream(what.to_string()),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Unauthorized(msg)
            | Self::Upstream(msg) => f.write_str(msg),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse {
            error: ErrorBody {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
            meta: ErrorMeta {
                request_id: uuid::Uuid::new_v4().to_string(),
            },
        };

        match self {
            Self::Internal(_) => HttpResponse::InternalServerError().json(error_response),
            Self::Validation(_) => HttpResponse::BadRequest().json(error_response),
            Self::NotFound(_) => HttpResponse::NotFound().json(error_response),
            Self::Conflict(_) => HttpResponse::Conflict().json(error_response),
            Self::Unauthorized(_) => HttpResponse::Unauthorized().json(error_response),
            Self::Upstream(_) => HttpResponse::BadGateway().json(error_response),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(full_name) => {
                Self::Conflict(format!("Repository already added: {full_name}"))
            }
            other => {
                tracing::error!("Repository store failure: {other}");
                Self::Internal(other.to_string())
            }
        }
    }
}
