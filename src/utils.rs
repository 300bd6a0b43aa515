use crate::schema::{DashboardSnapshot, Period, ReportTree};
use chrono::{DateTime, Datelike, NaiveDate};
use log::debug;

/// First year of the synthesized report axis.
pub const REPORT_AXIS_START_YEAR: i32 = 2024;
/// Last year (inclusive) of the synthesized report axis.
pub const REPORT_AXIS_END_YEAR: i32 = 2025;

pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Formats a date as its axis label, e.g. "Jan 2024".
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

pub fn next_month_start(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// One label per calendar month from January of `start_year` through
/// December of `end_year`. Empty when the range is inverted.
pub fn month_labels_between(start_year: i32, end_year: i32) -> Vec<String> {
    let mut labels = Vec::new();
    let (Some(mut current), Some(end)) = (
        NaiveDate::from_ymd_opt(start_year, 1, 1),
        NaiveDate::from_ymd_opt(end_year, 12, 1),
    ) else {
        return labels;
    };

    while current <= end {
        labels.push(month_label(current));
        match next_month_start(current) {
            Some(next) => current = next,
            None => break,
        }
    }

    labels
}

pub fn dashboard_date_axis(snapshot: &DashboardSnapshot) -> Vec<String> {
    snapshot.main_dashboard.date_array.clone()
}

/// Axis for report charts. Always the 24 months Jan 2024 through Dec 2025:
/// the selected period and the report's own start/end dates are not used to
/// re-bucket values.
pub fn report_date_axis(tree: &ReportTree, period: Period) -> Vec<String> {
    debug!(
        "Report axis fixed at {}-{} for {} period (report spans {:?} to {:?})",
        REPORT_AXIS_START_YEAR,
        REPORT_AXIS_END_YEAR,
        period.as_str(),
        tree.report_result.starting_date,
        tree.report_result.ending_date
    );
    month_labels_between(REPORT_AXIS_START_YEAR, REPORT_AXIS_END_YEAR)
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
