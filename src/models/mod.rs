// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod activity;
pub mod credentials;

pub use activity::{ActivityRecord, HeartRateSeries, Marker, ParsedActivity};
pub use credentials::CredentialRecord;
