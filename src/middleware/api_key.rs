// SPDX-License-Identifier: MIT

//! Shared-secret API key middleware for the ingest route.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Header the ingest client must present.
const API_KEY_HEADER: &str = "x-api-key";

/// Require a matching `x-api-key` header.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    if provided != Some(state.config.api_secret.as_str()) {
        tracing::warn!("Blocked ingest request with missing or invalid API key");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
