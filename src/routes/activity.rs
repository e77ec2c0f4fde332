// SPDX-License-Identifier: MIT

//! Activity ingest route.
//!
//! Validation and staging happen synchronously so the client gets a fast
//! answer; encoding and upload run later on a detached timer.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::ActivityRecord;
use crate::services::{encoder, processor};
use crate::time_utils;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/activity", post(ingest_activity))
}

#[derive(Serialize)]
pub struct IngestResponse {
    pub status: String,
    /// Name of the staged JSON file (the activity's artifact key)
    pub file: String,
}

/// Accept an activity record: validate, stage to disk, schedule processing.
async fn ingest_activity(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<IngestResponse>)> {
    let record: ActivityRecord = serde_json::from_value(payload)
        .map_err(|e| AppError::Validation(format!("missing or malformed field: {}", e)))?;

    let activity = record.validate()?;

    // Stage under the same artifact key the encoder will use for the GPX.
    let start_iso = time_utils::format_utc_rfc3339(activity.start_time);
    let filename = format!("{}.json", encoder::date_to_filename(&start_iso));

    let json_dir = state.config.json_dir();
    tokio::fs::create_dir_all(&json_dir).await?;

    let staged_path = json_dir.join(&filename);
    let json = serde_json::to_vec(&record)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Staging serialization: {}", e)))?;
    tokio::fs::write(&staged_path, json).await?;

    tracing::info!(
        file = %staged_path.display(),
        activity_type = %record.activity_type,
        "Activity staged for processing"
    );

    processor::schedule(state.clone(), staged_path);

    Ok((
        StatusCode::ACCEPTED,
        Json(IngestResponse {
            status: "accepted".to_string(),
            file: filename,
        }),
    ))
}
