//! Admin Authentication
//!
//! The admin panel is gated by a single shared secret supplied through
//! `ADMIN_PASSWORD`. The secret is kept only as a SHA-256 digest and
//! candidates are compared against it in constant time.
//!
//! Mutating handlers take an [`AdminGuard`] argument; it reads the
//! `Authorization: Bearer <secret>` header and rejects the request
//! before the handler body runs.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, web};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during admin authentication
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong secret
    #[error("Invalid admin credentials")]
    InvalidCredentials,

    /// No `Authorization: Bearer` header
    #[error("Missing admin token")]
    MissingToken,

    /// `ADMIN_PASSWORD` is not set
    #[error("Admin access not configured")]
    NotConfigured,
}

/// Shared-secret check for admin operations
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// Hex-encoded SHA-256 of the admin password
    secret_hash: String,
}

impl AdminAuth {
    pub fn new(password: &str) -> Self {
        Self {
            secret_hash: hash_secret(password),
        }
    }

    /// Build from the configured password, if any
    pub fn from_password(password: Option<&str>) -> Result<Self, AuthError> {
        password.map(Self::new).ok_or(AuthError::NotConfigured)
    }

    pub fn verify(&self, candidate: &str) -> Result<(), AuthError> {
        if constant_time_eq(&hash_secret(candidate), &self.secret_hash) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Hash a secret using SHA256
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

// ============================================================================
// Admin guard - FromRequest Implementation
// ============================================================================

/// Error response for authentication failures
#[derive(Debug, Serialize)]
struct AuthErrorResponse {
    error: AuthErrorBody,
    meta: AuthErrorMeta,
}

#[derive(Debug, Serialize)]
struct AuthErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct AuthErrorMeta {
    request_id: String,
}

impl AuthErrorResponse {
    fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: AuthErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: AuthErrorMeta {
                request_id: Uuid::new_v4().to_string(),
            },
        }
    }

    fn unauthorized() -> Self {
        Self::new("UNAUTHORIZED", "Unauthorized")
    }

    fn not_configured() -> Self {
        Self::new("INTERNAL_ERROR", "Admin access not configured")
    }
}

/// Extract Bearer token from Authorization header
///
/// Expected format: "Bearer <token>"
fn extract_bearer_token(req: &HttpRequest) -> Option<String> {
    let auth_header = req.headers().get("Authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Check for "Bearer " prefix (case-insensitive)
    if auth_str.len() > 7 && auth_str[..7].eq_ignore_ascii_case("Bearer ") {
        Some(auth_str[7..].to_string())
    } else {
        None
    }
}

/// Proof that the request carried the admin secret.
///
/// ```rust,ignore
/// pub async fn protected_handler(
///     _admin: AdminGuard,
/// ) -> Result<HttpResponse, AppError> { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AdminGuard;

impl AdminGuard {
    fn check(req: &HttpRequest) -> Result<Self, AuthError> {
        let auth = req
            .app_data::<web::Data<AdminAuth>>()
            .ok_or(AuthError::NotConfigured)?;
        let token = extract_bearer_token(req).ok_or(AuthError::MissingToken)?;
        auth.verify(&token)?;
        Ok(Self)
    }
}

impl FromRequest for AdminGuard {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::check(req).map_err(|e| {
            let response = match e {
                AuthError::NotConfigured => {
                    tracing::error!("Admin request rejected: ADMIN_PASSWORD not set");
                    HttpResponse::InternalServerError().json(AuthErrorResponse::not_configured())
                }
                AuthError::MissingToken | AuthError::InvalidCredentials => {
                    tracing::debug!("Admin request rejected: {e}");
                    HttpResponse::Unauthorized().json(AuthErrorResponse::unauthorized())
                }
            };
            actix_web::error::InternalError::from_response(e, response).into()
        }))
    }
}
