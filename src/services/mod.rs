// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod align;
pub mod encoder;
pub mod processor;
pub mod store;
pub mod strava;
pub mod token;
pub mod uploader;

pub use align::{TrackPoint, TrackSegment};
pub use encoder::GpxTemplate;
pub use store::CredentialStore;
pub use strava::{StravaClient, UploadResponse};
pub use token::TokenExchanger;
pub use uploader::ResilientUploader;
