// SPDX-License-Identifier: MIT

//! Single-tenant credential store.
//!
//! One JSON file holds the credentials of the one authorised account. The
//! store is an owned object injected into the exchanger and uploader rather
//! than ambient global state; only the token exchanger writes it. Two
//! overlapping refresh cycles can race on the file - an accepted limitation
//! of the single-tenant design.

use crate::error::AppError;
use crate::models::CredentialRecord;
use std::path::{Path, PathBuf};

/// File name under the data directory.
const CREDENTIAL_FILE: &str = "authorised-user-info.json";

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CREDENTIAL_FILE),
        }
    }

    /// Load the current credential record.
    ///
    /// A missing file means nobody has authorised the app yet, which is the
    /// same operator action as an expired refresh token: `ReauthRequired`.
    pub async fn load(&self) -> Result<CredentialRecord, AppError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::ReauthRequired)
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Corrupt credential file: {}", e)))
    }

    /// Overwrite the credential record.
    pub async fn save(&self, record: &CredentialRecord) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Credential serialization: {}", e)))?;

        tokio::fs::write(&self.path, json).await?;
        tracing::debug!(path = %self.path.display(), "Credential record saved");
        Ok(())
    }
}
