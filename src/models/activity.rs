// SPDX-License-Identifier: MIT

//! Inbound activity record and its validated form.
//!
//! The ingest payload carries the GPS track as parallel comma-separated
//! strings (one value per sample, equal lengths), plus an optional
//! independently-sampled heart-rate pair. `validate()` is the only path from
//! the raw record to the typed form the encoder consumes; records that fail
//! it are rejected before staging and never retried.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw activity payload as POSTed to the ingest endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// Source platform's activity vocabulary ("Running", "Cycling", ...)
    pub activity_type: String,
    /// Activity start in ISO-8601 / RFC3339
    pub activity_start_time_iso: String,
    /// Free-text notes, copied verbatim into the GPX description
    #[serde(default)]
    pub activity_notes: String,
    /// Per-sample marker ("start", "resume", "gps", "pause", ...)
    pub activity_path_type: String,
    pub activity_path_longitude: String,
    pub activity_path_latitude: String,
    pub activity_path_altitude: String,
    /// Seconds elapsed from the activity start, per sample
    pub activity_path_timestamp: String,
    /// Heart-rate sample times (elapsed seconds, non-decreasing)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_heart_rate_timestamp: Option<String>,
    /// Heart-rate values (bpm), parallel to the timestamps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_heart_rate: Option<String>,
}

/// Per-sample marker indicating whether a point opens a new track segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Start,
    Resume,
    /// Any other marker value: the point continues the open segment.
    Continuation,
}

impl Marker {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "start" => Marker::Start,
            "resume" => Marker::Resume,
            _ => Marker::Continuation,
        }
    }

    /// Both "start" and "resume" open a new segment.
    pub fn opens_segment(&self) -> bool {
        matches!(self, Marker::Start | Marker::Resume)
    }
}

/// Independently-sampled heart-rate series, sorted by elapsed time.
#[derive(Debug, Clone)]
pub struct HeartRateSeries {
    times: Vec<f64>,
    bpm: Vec<u16>,
}

impl HeartRateSeries {
    /// Build a series. Callers must supply equal-length, time-sorted data;
    /// `ActivityRecord::validate` enforces that for inbound payloads.
    pub fn new(times: Vec<f64>, bpm: Vec<u16>) -> Self {
        debug_assert_eq!(times.len(), bpm.len());
        Self { times, bpm }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Nearest prior-or-equal sample for a query time, as a predecessor
    /// search over the sorted timestamps. Queries at or beyond the last
    /// sample clamp to the last sample; queries before the first sample
    /// have no predecessor and return `None`.
    pub fn sample_at(&self, elapsed_sec: f64) -> Option<u16> {
        let idx = self.times.partition_point(|&t| t <= elapsed_sec);
        if idx == 0 {
            None
        } else {
            Some(self.bpm[idx - 1])
        }
    }
}

/// Activity record after validation: typed, equal-length series.
#[derive(Debug, Clone)]
pub struct ParsedActivity {
    pub activity_type: String,
    pub notes: String,
    pub start_time: DateTime<Utc>,
    pub markers: Vec<Marker>,
    pub longitudes: Vec<f64>,
    pub latitudes: Vec<f64>,
    pub altitudes: Vec<f64>,
    pub elapsed_secs: Vec<f64>,
    pub heart_rate: Option<HeartRateSeries>,
}

impl ActivityRecord {
    /// Validate the record and parse the series into their typed form.
    pub fn validate(&self) -> Result<ParsedActivity, AppError> {
        let start_time = DateTime::parse_from_rfc3339(&self.activity_start_time_iso)
            .map_err(|e| {
                AppError::Validation(format!("activityStartTimeIso is not ISO-8601: {}", e))
            })?
            .with_timezone(&Utc);

        let markers: Vec<Marker> = self
            .activity_path_type
            .split(',')
            .map(Marker::parse)
            .collect();

        if self.activity_path_type.trim().is_empty() {
            return Err(AppError::Validation("activityPathType is empty".to_string()));
        }

        if markers[0] != Marker::Start {
            return Err(AppError::Validation(
                "first activityPathType marker must be \"start\"".to_string(),
            ));
        }

        let n = markers.len();
        let longitudes = parse_numeric_series(&self.activity_path_longitude, "activityPathLongitude")?;
        let latitudes = parse_numeric_series(&self.activity_path_latitude, "activityPathLatitude")?;
        let altitudes = parse_numeric_series(&self.activity_path_altitude, "activityPathAltitude")?;
        let elapsed_secs = parse_numeric_series(&self.activity_path_timestamp, "activityPathTimestamp")?;

        for (key, len) in [
            ("activityPathLongitude", longitudes.len()),
            ("activityPathLatitude", latitudes.len()),
            ("activityPathAltitude", altitudes.len()),
            ("activityPathTimestamp", elapsed_secs.len()),
        ] {
            if len != n {
                return Err(AppError::Validation(format!(
                    "{} has {} values but activityPathType has {}",
                    key, len, n
                )));
            }
        }

        let heart_rate = self.parse_heart_rate()?;

        Ok(ParsedActivity {
            activity_type: self.activity_type.clone(),
            notes: self.activity_notes.clone(),
            start_time,
            markers,
            longitudes,
            latitudes,
            altitudes,
            elapsed_secs,
            heart_rate,
        })
    }

    /// Heart-rate series is optional but all-or-nothing.
    fn parse_heart_rate(&self) -> Result<Option<HeartRateSeries>, AppError> {
        let (raw_times, raw_bpm) = match (
            &self.activity_heart_rate_timestamp,
            &self.activity_heart_rate,
        ) {
            (None, None) => return Ok(None),
            (Some(t), Some(b)) => (t, b),
            _ => {
                return Err(AppError::Validation(
                    "activityHeartRateTimestamp and activityHeartRate must be supplied together"
                        .to_string(),
                ))
            }
        };

        let times = parse_numeric_series(raw_times, "activityHeartRateTimestamp")?;
        let bpm: Vec<u16> = raw_bpm
            .split(',')
            .map(|v| {
                v.trim().parse::<u16>().map_err(|_| {
                    AppError::Validation(format!(
                        "activityHeartRate contains a non-integer value: {:?}",
                        v.trim()
                    ))
                })
            })
            .collect::<Result<_, _>>()?;

        if times.len() != bpm.len() {
            return Err(AppError::Validation(format!(
                "activityHeartRateTimestamp has {} values but activityHeartRate has {}",
                times.len(),
                bpm.len()
            )));
        }

        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err(AppError::Validation(
                "activityHeartRateTimestamp values must be non-decreasing".to_string(),
            ));
        }

        Ok(Some(HeartRateSeries::new(times, bpm)))
    }
}

fn parse_numeric_series(raw: &str, key: &str) -> Result<Vec<f64>, AppError> {
    raw.split(',')
        .map(|v| {
            v.trim().parse::<f64>().map_err(|_| {
                AppError::Validation(format!(
                    "{} contains a non-numeric value: {:?}",
                    key,
                    v.trim()
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ActivityRecord {
        ActivityRecord {
            activity_type: "Running".to_string(),
            activity_start_time_iso: "2023-05-01T09:00:00Z".to_string(),
            activity_notes: "Morning run".to_string(),
            activity_path_type: "start,gps,gps".to_string(),
            activity_path_longitude: "-0.1278,-0.1279,-0.1280".to_string(),
            activity_path_latitude: "51.5074,51.5075,51.5076".to_string(),
            activity_path_altitude: "11.0,11.5,12.0".to_string(),
            activity_path_timestamp: "0,5,10".to_string(),
            activity_heart_rate_timestamp: None,
            activity_heart_rate: None,
        }
    }

    #[test]
    fn test_validate_well_formed_record() {
        let parsed = sample_record().validate().expect("record should validate");
        assert_eq!(parsed.markers.len(), 3);
        assert_eq!(parsed.latitudes, vec![51.5074, 51.5075, 51.5076]);
        assert_eq!(parsed.elapsed_secs, vec![0.0, 5.0, 10.0]);
        assert!(parsed.heart_rate.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_timestamp() {
        let mut record = sample_record();
        record.activity_start_time_iso = "yesterday".to_string();
        assert!(matches!(
            record.validate(),
            Err(AppError::Validation(msg)) if msg.contains("activityStartTimeIso")
        ));
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let mut record = sample_record();
        record.activity_path_altitude = "11.0,11.5".to_string();
        assert!(matches!(
            record.validate(),
            Err(AppError::Validation(msg)) if msg.contains("activityPathAltitude")
        ));
    }

    #[test]
    fn test_validate_rejects_non_numeric_value() {
        let mut record = sample_record();
        record.activity_path_longitude = "-0.1278,west,-0.1280".to_string();
        assert!(matches!(
            record.validate(),
            Err(AppError::Validation(msg)) if msg.contains("activityPathLongitude")
        ));
    }

    #[test]
    fn test_validate_rejects_record_not_starting_with_start() {
        let mut record = sample_record();
        record.activity_path_type = "gps,gps,gps".to_string();
        assert!(matches!(
            record.validate(),
            Err(AppError::Validation(msg)) if msg.contains("start")
        ));
    }

    #[test]
    fn test_validate_rejects_one_sided_heart_rate() {
        let mut record = sample_record();
        record.activity_heart_rate = Some("120,130".to_string());
        assert!(matches!(
            record.validate(),
            Err(AppError::Validation(msg)) if msg.contains("together")
        ));
    }

    #[test]
    fn test_validate_rejects_unsorted_heart_rate_times() {
        let mut record = sample_record();
        record.activity_heart_rate_timestamp = Some("0,10,5".to_string());
        record.activity_heart_rate = Some("120,130,140".to_string());
        assert!(matches!(
            record.validate(),
            Err(AppError::Validation(msg)) if msg.contains("non-decreasing")
        ));
    }

    #[test]
    fn test_validate_accepts_heart_rate_pair() {
        let mut record = sample_record();
        record.activity_heart_rate_timestamp = Some("0,5,10".to_string());
        record.activity_heart_rate = Some("120,130,140".to_string());
        let parsed = record.validate().expect("record should validate");
        let hr = parsed.heart_rate.expect("heart rate present");
        assert_eq!(hr.len(), 3);
    }

    #[test]
    fn test_marker_parse() {
        assert_eq!(Marker::parse("start"), Marker::Start);
        assert_eq!(Marker::parse("resume"), Marker::Resume);
        assert_eq!(Marker::parse("gps"), Marker::Continuation);
        assert_eq!(Marker::parse("pause"), Marker::Continuation);
        assert!(Marker::Start.opens_segment());
        assert!(Marker::Resume.opens_segment());
        assert!(!Marker::Continuation.opens_segment());
    }

    #[test]
    fn test_nearest_prior_heart_rate_lookup() {
        let hr = HeartRateSeries::new(vec![0.0, 10.0, 20.0], vec![60, 70, 80]);
        assert_eq!(hr.sample_at(5.0), Some(60));
        assert_eq!(hr.sample_at(10.0), Some(70)); // exact match
        assert_eq!(hr.sample_at(25.0), Some(80)); // clamped to last
        assert_eq!(hr.sample_at(0.0), Some(60));
    }

    #[test]
    fn test_heart_rate_lookup_before_first_sample() {
        let hr = HeartRateSeries::new(vec![5.0, 10.0], vec![60, 70]);
        assert_eq!(hr.sample_at(2.0), None);
    }

    #[test]
    fn test_heart_rate_lookup_single_element() {
        let hr = HeartRateSeries::new(vec![0.0], vec![65]);
        assert_eq!(hr.sample_at(0.0), Some(65));
        assert_eq!(hr.sample_at(9999.0), Some(65));
    }

    #[test]
    fn test_record_serde_round_trip_uses_camel_case_keys() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert!(json.get("activityStartTimeIso").is_some());
        assert!(json.get("activityPathType").is_some());
        assert!(json.get("activityHeartRate").is_none());
    }
}
