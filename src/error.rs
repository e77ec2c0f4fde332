// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.
//!
//! The error taxonomy drives the upload retry protocol: `AuthExpired` is the
//! only variant that triggers a token refresh, and `ReauthRequired` is the
//! terminal state that needs a human to redo the browser OAuth handshake.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing or invalid API key")]
    Unauthorized,

    #[error("Invalid activity payload: {0}")]
    Validation(String),

    #[error("GPX encoding failed: {0}")]
    Encode(String),

    #[error("Strava rejected the access token")]
    AuthExpired,

    #[error("Strava authorization must be redone via the OAuth handshake")]
    ReauthRequired,

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message marker for a 429 from Strava.
    pub const STRAVA_RATE_LIMIT: &'static str = "Strava rate limit exceeded";

    /// Message marker for a token grant the platform refused outright
    /// (expired/revoked refresh token, bad authorization code).
    pub const GRANT_REJECTED: &'static str = "Strava rejected the token grant";

    /// Whether this error means the token endpoint refused our grant.
    /// The uploader maps this to `ReauthRequired`; transient token endpoint
    /// failures (network, 5xx) are left alone.
    pub fn is_grant_rejection(&self) -> bool {
        matches!(self, AppError::StravaApi(msg) if msg.contains(Self::GRANT_REJECTED))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Server-side detail (Strava response bodies, I/O errors) is logged
        // here and never echoed to the caller.
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_payload", Some(msg.clone()))
            }
            AppError::Encode(msg) => {
                tracing::error!(error = %msg, "GPX encoding error");
                (StatusCode::INTERNAL_SERVER_ERROR, "encode_error", None)
            }
            AppError::AuthExpired => (StatusCode::BAD_GATEWAY, "strava_token_expired", None),
            AppError::ReauthRequired => (
                StatusCode::BAD_GATEWAY,
                "reauth_required",
                Some("Re-run the Strava authorization at /auth/strava".to_string()),
            ),
            AppError::StravaApi(msg) => {
                tracing::error!(error = %msg, "Strava API error");
                (StatusCode::BAD_GATEWAY, "strava_error", None)
            }
            AppError::Io(err) => {
                tracing::error!(error = %err, "I/O error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
