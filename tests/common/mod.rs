// SPDX-License-Identifier: MIT

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use strava_relay::config::Config;
use strava_relay::models::CredentialRecord;
use strava_relay::routes::create_router;
use strava_relay::services::{CredentialStore, StravaClient};
use strava_relay::AppState;

static TEST_DIR_SEQ: AtomicU64 = AtomicU64::new(0);

/// Fresh throwaway data directory with json/ and gpx/ subdirectories.
#[allow(dead_code)]
pub fn test_data_dir() -> PathBuf {
    let unique = format!(
        "strava-relay-test-{}-{}",
        std::process::id(),
        TEST_DIR_SEQ.fetch_add(1, Ordering::Relaxed)
    );
    let dir = std::env::temp_dir().join(unique);
    std::fs::create_dir_all(dir.join("json")).unwrap();
    std::fs::create_dir_all(dir.join("gpx")).unwrap();
    dir
}

/// Create a test app against the real Strava endpoints (never reached in
/// tests; the credential store starts empty). Returns the router and state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.data_dir = test_data_dir();

    let store = CredentialStore::new(&config.data_dir);
    let strava = StravaClient::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
    );

    let state = Arc::new(AppState {
        config,
        store,
        strava,
    });

    (create_router(state.clone()), state)
}

/// A well-formed ingest payload (three points, one segment).
#[allow(dead_code)]
pub fn sample_activity_payload() -> serde_json::Value {
    json!({
        "activityType": "Running",
        "activityStartTimeIso": "2023-05-01T09:00:00Z",
        "activityNotes": "Morning run",
        "activityPathType": "start,gps,gps",
        "activityPathLongitude": "-0.1278,-0.1279,-0.1280",
        "activityPathLatitude": "51.5074,51.5075,51.5076",
        "activityPathAltitude": "11.0,11.5,12.0",
        "activityPathTimestamp": "0,5,10"
    })
}

/// A stale-looking credential record to seed stores with.
#[allow(dead_code)]
pub fn stale_credentials() -> CredentialRecord {
    CredentialRecord {
        name: "Jo Bloggs".to_string(),
        account_id: "42".to_string(),
        access_token: "stale-access".to_string(),
        refresh_token: "stale-refresh".to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock Strava server
// ─────────────────────────────────────────────────────────────────────────────

/// In-process stand-in for Strava's uploads and token endpoints, with
/// scriptable failures and call counters.
pub struct MockStrava {
    /// Number of initial upload attempts to answer with 401
    pub unauthorized_uploads: u32,
    /// Answer every upload with a 500
    pub server_error_uploads: bool,
    /// Answer refresh grants with a 400
    pub reject_refresh: bool,
    pub upload_calls: AtomicU32,
    pub refresh_calls: AtomicU32,
    pub code_exchanges: AtomicU32,
}

impl MockStrava {
    /// Spawn the mock server; returns its base URL and the shared handle.
    #[allow(dead_code)]
    pub async fn spawn(
        unauthorized_uploads: u32,
        server_error_uploads: bool,
        reject_refresh: bool,
    ) -> (String, Arc<MockStrava>) {
        let mock = Arc::new(MockStrava {
            unauthorized_uploads,
            server_error_uploads,
            reject_refresh,
            upload_calls: AtomicU32::new(0),
            refresh_calls: AtomicU32::new(0),
            code_exchanges: AtomicU32::new(0),
        });

        let app = Router::new()
            .route("/uploads", post(mock_uploads))
            .route("/oauth/token", post(mock_token))
            .with_state(mock.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), mock)
    }

    /// Strava client pointed at this mock.
    #[allow(dead_code)]
    pub fn client(&self, base_url: &str) -> StravaClient {
        StravaClient::with_endpoints(
            "test_client_id".to_string(),
            "test_secret".to_string(),
            base_url.to_string(),
            format!("{}/oauth/token", base_url),
        )
    }
}

async fn mock_uploads(State(mock): State<Arc<MockStrava>>) -> Response {
    let attempt = mock.upload_calls.fetch_add(1, Ordering::SeqCst);

    if mock.server_error_uploads {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Internal Error" })),
        )
            .into_response();
    }

    if attempt < mock.unauthorized_uploads {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Authorization Error" })),
        )
            .into_response();
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "id": 9001u64,
            "id_str": "9001",
            "external_id": "20230501-090000.gpx",
            "status": "Your activity is still being processed."
        })),
    )
        .into_response()
}

async fn mock_token(
    State(mock): State<Arc<MockStrava>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") => {
            mock.code_exchanges.fetch_add(1, Ordering::SeqCst);
            (
                StatusCode::OK,
                Json(json!({
                    "access_token": "code-access",
                    "refresh_token": "code-refresh",
                    "expires_at": 1999999999u64,
                    "athlete": { "id": 42u64, "firstname": "Jo", "lastname": "Bloggs" }
                })),
            )
                .into_response()
        }
        Some("refresh_token") => {
            mock.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if mock.reject_refresh {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": "invalid grant" })),
                )
                    .into_response()
            } else {
                // Refresh responses carry no athlete profile.
                (
                    StatusCode::OK,
                    Json(json!({
                        "access_token": "refreshed-access",
                        "refresh_token": "refreshed-refresh",
                        "expires_at": 1999999999u64
                    })),
                )
                    .into_response()
            }
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "unknown grant_type" })),
        )
            .into_response(),
    }
}
