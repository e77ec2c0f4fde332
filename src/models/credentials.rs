// SPDX-License-Identifier: MIT

//! Strava credential record for the single authorised account.

use serde::{Deserialize, Serialize};

/// The one process-wide credential record. Created on the first successful
/// OAuth code exchange, overwritten on every refresh, never deleted by the
/// app (revocation happens on Strava's side).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Athlete display name ("firstname lastname")
    pub name: String,
    /// Strava athlete ID, as a string
    pub account_id: String,
    /// Current access token
    pub access_token: String,
    /// Current refresh token
    pub refresh_token: String,
}
