// SPDX-License-Identifier: MIT

//! Strava OAuth authorization routes.
//!
//! The browser handshake is manual and rare: the operator visits
//! `/auth/strava` once, and again whenever an upload ends in
//! `reauth_required`.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::services::TokenExchanger;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/strava", get(auth_start))
        .route("/auth/strava/callback", get(auth_callback))
}

/// Start the OAuth flow - redirect to Strava authorization.
async fn auth_start(State(state): State<Arc<AppState>>) -> Redirect {
    let callback_url = format!("{}/auth/strava/callback", state.config.public_url);

    let auth_url = format!(
        "https://www.strava.com/oauth/authorize?\
         client_id={}&\
         redirect_uri={}&\
         response_type=code&\
         approval_prompt=auto&\
         scope=activity:write",
        state.config.strava_client_id,
        urlencoding::encode(&callback_url),
    );

    tracing::info!(
        client_id = %state.config.strava_client_id,
        "Starting OAuth flow, redirecting to Strava"
    );

    Redirect::temporary(&auth_url)
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct AuthCallbackResponse {
    pub status: String,
    /// Display name of the authorised athlete
    pub athlete: String,
}

/// OAuth callback - exchange the code for tokens and store them.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<AuthCallbackResponse>> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        return Err(AppError::Validation(format!(
            "Strava authorization failed: {}",
            error
        )));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::Validation("missing authorization code".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");

    let exchanger = TokenExchanger::new(state.strava.clone(), state.store.clone());
    let record = exchanger.exchange(Some(&code), None).await?;

    tracing::info!(
        account_id = %record.account_id,
        name = %record.name,
        "Strava account authorised"
    );

    Ok(Json(AuthCallbackResponse {
        status: "authorised".to_string(),
        athlete: record.name,
    }))
}
