// SPDX-License-Identifier: MIT

//! GPX encoding of validated activity records.
//!
//! Populates a fixed GPX 1.1 skeleton with the activity metadata and the
//! segments produced by the waypoint aligner, then writes the artifact under
//! a filename derived from the UTC start timestamp.

use crate::error::AppError;
use crate::models::ParsedActivity;
use crate::services::align::{self, TrackSegment};
use crate::time_utils;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Fixed skeleton of the generated GPX document.
#[derive(Debug, Clone)]
pub struct GpxTemplate {
    pub creator: String,
    pub version: String,
    pub namespace: String,
    /// Garmin TrackPointExtension namespace, used for heart rate
    pub extension_namespace: String,
}

impl Default for GpxTemplate {
    fn default() -> Self {
        Self {
            creator: "strava-relay".to_string(),
            version: "1.1".to_string(),
            namespace: "http://www.topografix.com/GPX/1/1".to_string(),
            extension_namespace: "http://www.garmin.com/xmlschemas/TrackPointExtension/v1"
                .to_string(),
        }
    }
}

/// Map the source platform's activity vocabulary onto Strava's.
/// Closed lookup; anything unmapped falls back to "Run".
pub fn map_activity_type(activity_type: &str) -> &'static str {
    match activity_type {
        "Cycling" => "Ride",
        "Running" => "Run",
        "Walking" => "Walk",
        _ => "Run",
    }
}

/// Human-readable activity title, rendered in UK local time,
/// e.g. "Running activity on Monday 1st May at 10:00".
pub fn activity_title(activity: &ParsedActivity) -> String {
    let local = time_utils::uk_local(activity.start_time);
    format!(
        "{} activity on {} {} {} at {}",
        activity.activity_type,
        local.format("%A"),
        time_utils::ordinal_day(chrono::Datelike::day(&local)),
        local.format("%B"),
        local.format("%H:%M"),
    )
}

/// Derive the artifact key from an ISO-8601 UTC timestamp: strip `-`, `:`
/// and `Z`, replace the date/time separator with `-`.
/// `"2023-05-01T09:00:00Z"` becomes `"20230501-090000"`.
pub fn date_to_filename(iso_date: &str) -> String {
    iso_date
        .chars()
        .filter(|c| !matches!(c, '-' | ':' | 'Z' | 'z'))
        .map(|c| if c == 'T' { '-' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Encode an activity to a GPX file in `output_dir`.
///
/// Deterministic: the same record and template produce a byte-identical
/// artifact. No overwrite check; two activities sharing a start second would
/// collide and the last write wins.
pub fn encode(
    activity: &ParsedActivity,
    template: &GpxTemplate,
    output_dir: &Path,
) -> Result<PathBuf, AppError> {
    let start_iso = time_utils::format_utc_rfc3339(activity.start_time);

    let filename = date_to_filename(&start_iso);
    if filename.is_empty() {
        return Err(AppError::Encode("derived filename is empty".to_string()));
    }

    let segments = align::align(activity);
    let title = activity_title(activity);
    let sport = map_activity_type(&activity.activity_type);
    let xml = write_gpx(template, &title, &activity.notes, sport, &start_iso, &segments);

    let path = output_dir.join(format!("{}.gpx", filename));
    std::fs::write(&path, xml)?;

    tracing::info!(file = %path.display(), segments = segments.len(), "GPX artifact written");
    Ok(path)
}

/// Serialize the populated template to GPX text.
fn write_gpx(
    template: &GpxTemplate,
    title: &str,
    description: &str,
    sport: &str,
    start_iso: &str,
    segments: &[TrackSegment],
) -> String {
    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        xml,
        "<gpx version=\"{}\" creator=\"{}\" xmlns=\"{}\" xmlns:gpxtpx=\"{}\">",
        template.version, template.creator, template.namespace, template.extension_namespace
    );

    xml.push_str("  <metadata>\n");
    let _ = writeln!(xml, "    <name>{}</name>", cdata(title));
    let _ = writeln!(xml, "    <desc>{}</desc>", cdata(description));
    let _ = writeln!(xml, "    <time>{}</time>", start_iso);
    xml.push_str("  </metadata>\n");

    xml.push_str("  <trk>\n");
    let _ = writeln!(xml, "    <name>{}</name>", cdata(title));
    let _ = writeln!(xml, "    <type>{}</type>", sport);

    for segment in segments {
        xml.push_str("    <trkseg>\n");
        for point in &segment.points {
            let _ = writeln!(xml, "      <trkpt lat=\"{}\" lon=\"{}\">", point.lat, point.lon);
            let _ = writeln!(xml, "        <ele>{}</ele>", point.ele);
            let _ = writeln!(
                xml,
                "        <time>{}</time>",
                time_utils::format_utc_rfc3339(point.time)
            );
            if let Some(bpm) = point.heart_rate {
                xml.push_str("        <extensions>\n");
                xml.push_str("          <gpxtpx:TrackPointExtension>\n");
                let _ = writeln!(xml, "            <gpxtpx:hr>{}</gpxtpx:hr>", bpm);
                xml.push_str("          </gpxtpx:TrackPointExtension>\n");
                xml.push_str("        </extensions>\n");
            }
            xml.push_str("      </trkpt>\n");
        }
        xml.push_str("    </trkseg>\n");
    }

    xml.push_str("  </trk>\n");
    xml.push_str("</gpx>\n");

    xml
}

/// Wrap a text node in CDATA, splitting any `]]>` the text itself contains.
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}
