// SPDX-License-Identifier: MIT

//! OAuth token exchange against Strava's token endpoint.
//!
//! The exchanger owns all writes to the credential store. HTTP and platform
//! errors pass through unmodified; deciding whether a failed refresh means
//! "reauthorize manually" is the uploader's job.

use crate::error::AppError;
use crate::models::CredentialRecord;
use crate::services::store::CredentialStore;
use crate::services::strava::StravaClient;

#[derive(Clone)]
pub struct TokenExchanger {
    client: StravaClient,
    store: CredentialStore,
}

impl TokenExchanger {
    pub fn new(client: StravaClient, store: CredentialStore) -> Self {
        Self { client, store }
    }

    /// Exchange a grant for a token pair and persist the result.
    ///
    /// The code grant wins when both grants are supplied; neither grant is a
    /// validation error. Refresh responses carry no athlete profile, so the
    /// previously stored identity fields are preserved - a refresh without a
    /// readable prior record fails rather than writing empty identity
    /// strings.
    pub async fn exchange(
        &self,
        code: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<CredentialRecord, AppError> {
        let record = match (code, refresh_token) {
            (Some(code), _) => {
                let response = self.client.exchange_code(code).await?;
                CredentialRecord {
                    name: format!(
                        "{} {}",
                        response.athlete.firstname, response.athlete.lastname
                    ),
                    account_id: response.athlete.id.to_string(),
                    access_token: response.access_token,
                    refresh_token: response.refresh_token,
                }
            }
            (None, Some(refresh)) => {
                // Identity can only come from the stored record on this
                // grant, so the store must be readable before anything is
                // exchanged; otherwise empty identity strings would be
                // persisted over the real ones.
                let prior = self.store.load().await?;
                let response = self.client.refresh_token(refresh).await?;
                CredentialRecord {
                    name: prior.name,
                    account_id: prior.account_id,
                    access_token: response.access_token,
                    refresh_token: response.refresh_token,
                }
            }
            (None, None) => {
                return Err(AppError::Validation(
                    "either an authorization code or a refresh token is required".to_string(),
                ))
            }
        };

        self.store.save(&record).await?;
        tracing::info!(account_id = %record.account_id, "Strava credentials stored");
        Ok(record)
    }
}
