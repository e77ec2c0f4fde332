// SPDX-License-Identifier: MIT

//! Waypoint alignment: rebuilds the segmented, time-ordered track from the
//! flattened parallel series and attaches heart rate by nearest-prior lookup.

use crate::models::ParsedActivity;
use chrono::{DateTime, Utc};

/// A single time-stamped track point.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    /// Elevation in meters
    pub ele: f64,
    /// Absolute UTC time (activity start + elapsed seconds)
    pub time: DateTime<Utc>,
    /// Interpolated heart rate, when the record carries a heart-rate series
    pub heart_rate: Option<u16>,
}

/// One continuous period of movement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSegment {
    pub points: Vec<TrackPoint>,
}

/// Rebuild ordered track segments from a validated activity.
///
/// "start" and "resume" markers open a new segment; every other marker
/// appends to the open segment. Validation guarantees the first marker is
/// "start", so the defensive open below is unreachable for records that came
/// through `ActivityRecord::validate`.
pub fn align(activity: &ParsedActivity) -> Vec<TrackSegment> {
    let mut segments: Vec<TrackSegment> = Vec::new();

    for (i, marker) in activity.markers.iter().enumerate() {
        if marker.opens_segment() || segments.is_empty() {
            segments.push(TrackSegment::default());
        }

        let elapsed = activity.elapsed_secs[i];
        let time = activity.start_time
            + chrono::Duration::milliseconds((elapsed * 1000.0).round() as i64);

        let heart_rate = activity
            .heart_rate
            .as_ref()
            .and_then(|hr| hr.sample_at(elapsed));

        let segment = segments.last_mut().expect("segment opened above");
        segment.points.push(TrackPoint {
            lat: activity.latitudes[i],
            lon: activity.longitudes[i],
            ele: activity.altitudes[i],
            time,
            heart_rate,
        });
    }

    segments
}
