// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Shared secret the ingest client must present in `x-api-key`
    pub api_secret: String,
    /// Public base URL of this service, used for the OAuth callback
    pub public_url: String,
    /// Server port
    pub port: u16,
    /// Root of the on-disk working area (json/, gpx/, credential file)
    pub data_dir: PathBuf,
    /// Delay between staging an activity and processing it. Smooths bursts
    /// against Strava's short-window rate limit.
    pub process_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            api_secret: env::var("API_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("API_SECRET"))?,
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            port,
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            process_delay: Duration::from_secs(
                env::var("PROCESS_DELAY_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            ),
        })
    }

    /// Config for tests: no delay, throwaway data dir.
    pub fn test_default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            api_secret: "test_api_key".to_string(),
            public_url: "http://localhost:8080".to_string(),
            port: 8080,
            data_dir: std::env::temp_dir().join("strava-relay-test"),
            process_delay: Duration::from_secs(0),
        }
    }

    /// Directory where inbound activity JSON is staged.
    pub fn json_dir(&self) -> PathBuf {
        self.data_dir.join("json")
    }

    /// Directory where encoded GPX artifacts are written.
    pub fn gpx_dir(&self) -> PathBuf {
        self.data_dir.join("gpx")
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
