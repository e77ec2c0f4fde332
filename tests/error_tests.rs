// SPDX-License-Identifier: MIT

use axum::http::StatusCode;
use axum::response::IntoResponse;
use strava_relay::error::AppError;

#[test]
fn test_is_grant_rejection_matches() {
    let err = AppError::StravaApi(format!("{} (HTTP 400: invalid grant)", AppError::GRANT_REJECTED));
    assert!(err.is_grant_rejection());

    let err = AppError::StravaApi(AppError::GRANT_REJECTED.to_string());
    assert!(err.is_grant_rejection());
}

#[test]
fn test_is_grant_rejection_no_match() {
    let err = AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string());
    assert!(!err.is_grant_rejection());

    let err = AppError::StravaApi("HTTP 503: unavailable".to_string());
    assert!(!err.is_grant_rejection());

    assert!(!AppError::AuthExpired.is_grant_rejection());
    assert!(!AppError::ReauthRequired.is_grant_rejection());
}

#[test]
fn test_response_status_codes() {
    assert_eq!(
        AppError::Unauthorized.into_response().status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::Validation("bad".to_string()).into_response().status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::ReauthRequired.into_response().status(),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        AppError::StravaApi("boom".to_string()).into_response().status(),
        StatusCode::BAD_GATEWAY
    );
}

#[tokio::test]
async fn test_internal_detail_is_not_echoed() {
    let err = AppError::StravaApi("HTTP 500: secret internal detail".to_string());
    let response = err.into_response();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(text.contains("strava_error"));
    assert!(!text.contains("secret internal detail"));
}
