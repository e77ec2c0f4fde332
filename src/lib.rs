// SPDX-License-Identifier: MIT

//! Strava-Relay: JSON activity exports to Strava, via GPX
//!
//! This crate provides the backend for converting fitness-activity JSON
//! (GPS track plus optional heart rate) into GPX files and uploading them
//! to Strava, refreshing expired OAuth tokens along the way.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{CredentialStore, StravaClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: CredentialStore,
    pub strava: StravaClient,
}
