// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Convert a UTC timestamp to UK civil time.
///
/// BST (UTC+1) runs from 01:00 UTC on the last Sunday of March to 01:00 UTC
/// on the last Sunday of October; GMT (UTC+0) otherwise.
pub fn uk_local(date: DateTime<Utc>) -> DateTime<FixedOffset> {
    let year = date.year();
    let bst = date >= last_sunday_1am_utc(year, 3) && date < last_sunday_1am_utc(year, 10);
    let offset_secs = if bst { 3600 } else { 0 };
    let offset = FixedOffset::east_opt(offset_secs).expect("offset within bounds");
    date.with_timezone(&offset)
}

/// 01:00 UTC on the last Sunday of the given month.
fn last_sunday_1am_utc(year: i32, month: u32) -> DateTime<Utc> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid month boundary");

    let last_day = first_of_next.pred_opt().expect("month has a last day");
    let days_back = last_day.weekday().num_days_from_sunday();
    let sunday = last_day - chrono::Duration::days(days_back as i64);

    sunday
        .and_hms_opt(1, 0, 0)
        .expect("valid time of day")
        .and_utc()
}

/// Render a day-of-month with its English ordinal suffix (1st, 2nd, 23rd).
pub fn ordinal_day(day: u32) -> String {
    let suffix = match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };
    format!("{}{}", day, suffix)
}
