// SPDX-License-Identifier: MIT

//! Delayed activity pipeline.
//!
//! Each staged activity gets one detached timer task: sleep the configured
//! delay, then read staged JSON, encode to GPX and upload. The delay smooths
//! bursts against Strava's short-window rate limit; it is not an ordering
//! guarantee. Nothing awaits the task and there is no retry if the process
//! restarts before the timer fires - the staged file is simply orphaned.

use crate::error::AppError;
use crate::models::ActivityRecord;
use crate::services::encoder::{self, GpxTemplate};
use crate::services::token::TokenExchanger;
use crate::services::uploader::ResilientUploader;
use crate::AppState;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Schedule a staged activity for processing after the configured delay.
pub fn schedule(state: Arc<AppState>, staged_path: PathBuf) {
    let delay = state.config.process_delay;

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        match process(&state, &staged_path).await {
            Ok(upload_id) => {
                tracing::info!(
                    path = %staged_path.display(),
                    upload_id,
                    "Activity uploaded to Strava"
                );
            }
            Err(err) => {
                tracing::error!(
                    path = %staged_path.display(),
                    error = %err,
                    "Activity pipeline failed"
                );
            }
        }
    });
}

/// Run the pipeline for one staged file: parse, encode, upload.
pub async fn process(state: &AppState, staged_path: &Path) -> Result<u64, AppError> {
    tracing::info!(path = %staged_path.display(), "Processing staged activity");

    let raw = tokio::fs::read_to_string(staged_path).await?;
    let record: ActivityRecord = serde_json::from_str(&raw)
        .map_err(|e| AppError::Validation(format!("staged JSON is not an activity record: {}", e)))?;
    let activity = record.validate()?;

    let artifact = encoder::encode(&activity, &GpxTemplate::default(), &state.config.gpx_dir())?;
    let title = encoder::activity_title(&activity);

    let uploader = ResilientUploader::new(
        state.strava.clone(),
        TokenExchanger::new(state.strava.clone(), state.store.clone()),
        state.store.clone(),
    );

    let response = uploader.upload(&artifact, &title, &activity.notes).await?;
    Ok(response.id)
}
