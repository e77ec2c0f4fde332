// SPDX-License-Identifier: MIT

//! Strava API client.
//!
//! Handles:
//! - GPX uploads to the uploads endpoint (multipart)
//! - OAuth code-for-token and refresh-token exchanges
//! - Classifying 401s so the uploader can trigger its single refresh

use crate::error::AppError;
use serde::Deserialize;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self::with_endpoints(
            client_id,
            client_secret,
            "https://www.strava.com/api/v3".to_string(),
            "https://www.strava.com/oauth/token".to_string(),
        )
    }

    /// Create a client against alternative endpoints. Used by tests to point
    /// at a local mock server.
    pub fn with_endpoints(
        client_id: String,
        client_secret: String,
        base_url: String,
        token_url: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            token_url,
            client_id,
            client_secret,
        }
    }

    /// Upload a GPX artifact to Strava's uploads endpoint.
    ///
    /// A created-resource response yields the upload record; a 401 maps to
    /// `AuthExpired` so the caller can refresh and retry.
    pub async fn upload_activity(
        &self,
        access_token: &str,
        gpx: Vec<u8>,
        filename: &str,
        name: &str,
        description: &str,
    ) -> Result<UploadResponse, AppError> {
        let file_part = reqwest::multipart::Part::bytes(gpx).file_name(filename.to_string());

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("name", name.to_string())
            .text("description", description.to_string())
            .text("trainer", "false")
            .text("commute", "false")
            .text("data_type", "gpx");

        let response = self
            .http
            .post(format!("{}/uploads", self.base_url))
            .bearer_auth(access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Upload request failed: {}", e)))?;

        self.check_upload_response(response).await
    }

    /// Exchange an authorization code for a token pair plus athlete profile.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token exchange request failed: {}", e)))?;

        self.check_token_response(response).await
    }

    /// Exchange a refresh token for a fresh token pair.
    ///
    /// Strava omits the athlete profile on this grant; the exchanger keeps
    /// the stored identity fields.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token refresh request failed: {}", e)))?;

        self.check_token_response(response).await
    }

    /// Check an uploads-endpoint response and parse the JSON body.
    async fn check_upload_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)));
        }

        let body = response.text().await.unwrap_or_default();

        // Unauthorized - token expired or revoked
        if status.as_u16() == 401 {
            return Err(AppError::AuthExpired);
        }

        if status.as_u16() == 429 {
            tracing::warn!("Strava rate limit hit (429)");
            return Err(AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string()));
        }

        Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)))
    }

    /// Check a token-endpoint response and parse the JSON body.
    ///
    /// 4xx here means the grant itself was refused (bad code, revoked
    /// refresh token) and is tagged so the uploader can distinguish it from
    /// transient failures.
    async fn check_token_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)));
        }

        let body = response.text().await.unwrap_or_default();

        if status.is_client_error() {
            return Err(AppError::StravaApi(format!(
                "{} (HTTP {}: {})",
                AppError::GRANT_REJECTED,
                status,
                body
            )));
        }

        Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)))
    }
}

/// Uploads endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub id: u64,
    #[serde(default)]
    pub status: Option<String>,
}

/// Token endpoint response for the authorization-code grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub athlete: StravaAthlete,
}

/// Token endpoint response for the refresh grant (no athlete profile).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Athlete profile embedded in the code-grant response.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthlete {
    pub id: u64,
    pub firstname: String,
    pub lastname: String,
}
