// SPDX-License-Identifier: MIT

//! Resilient upload of a GPX artifact to Strava.
//!
//! One invocation makes at most two upload attempts and at most one token
//! refresh. There is deliberately no retry loop and no backoff: Strava's
//! rate limit is enforced on their side, and anything other than an expired
//! access token surfaces to the caller immediately.

use crate::error::AppError;
use crate::services::store::CredentialStore;
use crate::services::strava::{StravaClient, UploadResponse};
use crate::services::token::TokenExchanger;
use std::path::Path;

/// Outcome of a single upload attempt.
enum Attempt {
    Created(UploadResponse),
    TokenExpired,
    Failed(AppError),
}

pub struct ResilientUploader {
    client: StravaClient,
    exchanger: TokenExchanger,
    store: CredentialStore,
}

impl ResilientUploader {
    pub fn new(client: StravaClient, exchanger: TokenExchanger, store: CredentialStore) -> Self {
        Self {
            client,
            exchanger,
            store,
        }
    }

    /// Upload an artifact, refreshing the access token once if it has
    /// expired.
    ///
    /// Flow: load credentials, attempt; on token expiry refresh via the
    /// exchanger, re-read the store, attempt exactly once more. A second
    /// expiry, or a refresh the platform refuses, is terminal and requires
    /// the operator to redo the OAuth handshake.
    pub async fn upload(
        &self,
        artifact: &Path,
        name: &str,
        description: &str,
    ) -> Result<UploadResponse, AppError> {
        let gpx = tokio::fs::read(artifact).await?;
        let filename = artifact
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("activity.gpx")
            .to_string();

        let credentials = self.store.load().await?;

        match self
            .attempt(&credentials.access_token, &gpx, &filename, name, description)
            .await
        {
            Attempt::Created(response) => Ok(response),
            Attempt::Failed(err) => Err(err),
            Attempt::TokenExpired => {
                tracing::info!("Access token expired, refreshing once before retry");

                self.exchanger
                    .exchange(None, Some(&credentials.refresh_token))
                    .await
                    .map_err(|e| {
                        if e.is_grant_rejection() {
                            AppError::ReauthRequired
                        } else {
                            e
                        }
                    })?;

                // Re-read rather than trusting the in-flight copy; the store
                // owns the record.
                let credentials = self.store.load().await?;

                match self
                    .attempt(&credentials.access_token, &gpx, &filename, name, description)
                    .await
                {
                    Attempt::Created(response) => Ok(response),
                    Attempt::TokenExpired => Err(AppError::ReauthRequired),
                    Attempt::Failed(err) => Err(err),
                }
            }
        }
    }

    async fn attempt(
        &self,
        access_token: &str,
        gpx: &[u8],
        filename: &str,
        name: &str,
        description: &str,
    ) -> Attempt {
        match self
            .client
            .upload_activity(access_token, gpx.to_vec(), filename, name, description)
            .await
        {
            Ok(response) => Attempt::Created(response),
            Err(AppError::AuthExpired) => Attempt::TokenExpired,
            Err(err) => Attempt::Failed(err),
        }
    }
}
