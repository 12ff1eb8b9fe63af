//! Axis math and labels for the temperature trend views.

use chrono::NaiveDate;

/// Y-axis segment cap for the hourly trend.
pub const HOURLY_MAX_SEGMENTS: u32 = 5;
/// Y-axis segment cap for the weekly trend.
pub const WEEKLY_MAX_SEGMENTS: u32 = 6;

const MIN_SEGMENTS: u32 = 2;

/// Number of y-axis segments for a temperature range: one per rounded
/// degree of span, clamped to [2, cap].
pub fn tick_segments(lowest: f64, highest: f64, cap: u32) -> u32 {
    let steps = (highest.round() - lowest.round()) as i64 + 1;
    steps.clamp(i64::from(MIN_SEGMENTS), i64::from(cap)) as u32
}

/// Hour label for the hourly chart: "HH" for every third sample, empty
/// otherwise. Falls back to the raw string when the timestamp has no time
/// part.
pub fn hourly_label(time: &str, index: usize) -> String {
    if index % 3 != 0 {
        return String::new();
    }
    match time.split('T').nth(1) {
        Some(clock) => clock.chars().take(2).collect(),
        None => time.to_string(),
    }
}

/// Weekday abbreviation for an ISO date, falling back to the raw string.
pub fn day_label(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// "MM/DD" for an ISO date, falling back to the raw string.
pub fn short_date_label(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%m/%d").to_string())
        .unwrap_or_else(|_| date.to_string())
}
