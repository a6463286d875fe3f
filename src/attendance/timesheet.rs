use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Period {
    Week,
    Month,
}

impl Default for Period {
    fn default() -> Self {
        Period::Week
    }
}

/// Inclusive date bounds of the ISO week or calendar month containing
/// `reference`.
pub fn period_bounds(period: Period, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    match period {
        Period::Week => {
            let start =
                reference - Duration::days(reference.weekday().num_days_from_monday() as i64);
            (start, start + Duration::days(6))
        }
        Period::Month => {
            let start = reference
                .with_day(1)
                .expect("first day of month is always valid");
            let next_month = if reference.month() == 12 {
                NaiveDate::from_ymd_opt(reference.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(reference.year(), reference.month() + 1, 1)
            }
            .expect("first day of next month is always valid");
            (start, next_month - Duration::days(1))
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimesheetSummary {
    #[schema(example = 41.75)]
    pub total_hours: f64,
    #[schema(example = 5)]
    pub days_present: u32,
    #[schema(example = 0)]
    pub days_absent: u32,
    pub period: Period,
    #[schema(example = "2026-08-24")]
    pub start_date: String,
    #[schema(example = "2026-08-30")]
    pub end_date: String,
}

/// Aggregate a period's records. "Present" counts both on-time and late
/// days, mirroring how the admin dashboard reads the numbers.
pub fn summarize(
    records: &[AttendanceRecord],
    period: Period,
    start: NaiveDate,
    end: NaiveDate,
) -> TimesheetSummary {
    let total: f64 = records.iter().filter_map(|r| r.work_hours).sum();

    TimesheetSummary {
        total_hours: (total * 100.0).round() / 100.0,
        days_present: records
            .iter()
            .filter(|r| r.status != AttendanceStatus::Absent)
            .count() as u32,
        days_absent: records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Absent)
            .count() as u32,
        period,
        start_date: super::engine::day_key(start),
        end_date: super::engine::day_key(end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_bounds_are_monday_through_sunday() {
        // 2026-08-26 is a Wednesday.
        let (start, end) = period_bounds(Period::Week, date(2026, 8, 26));
        assert_eq!(start, date(2026, 8, 24));
        assert_eq!(end, date(2026, 8, 30));

        // A Monday reference starts its own week.
        let (start, end) = period_bounds(Period::Week, date(2026, 8, 24));
        assert_eq!(start, date(2026, 8, 24));
        assert_eq!(end, date(2026, 8, 30));
    }

    #[test]
    fn month_bounds_handle_short_months_and_year_end() {
        let (start, end) = period_bounds(Period::Month, date(2024, 2, 15));
        assert_eq!(start, date(2024, 2, 1));
        assert_eq!(end, date(2024, 2, 29));

        let (start, end) = period_bounds(Period::Month, date(2026, 12, 3));
        assert_eq!(start, date(2026, 12, 1));
        assert_eq!(end, date(2026, 12, 31));
    }

    #[test]
    fn summary_counts_late_days_as_present() {
        let mk = |status: AttendanceStatus, hours: Option<f64>| AttendanceRecord {
            id: 0,
            employee_id: 1,
            date: "2026-08-24".into(),
            check_in: None,
            check_out: None,
            status,
            ip_address: None,
            lat: None,
            lng: None,
            work_hours: hours,
        };

        let records = vec![
            mk(AttendanceStatus::Present, Some(8.5)),
            mk(AttendanceStatus::Late, Some(7.25)),
            mk(AttendanceStatus::Absent, None),
        ];

        let summary = summarize(&records, Period::Week, date(2026, 8, 24), date(2026, 8, 30));
        assert_eq!(summary.total_hours, 15.75);
        assert_eq!(summary.days_present, 2);
        assert_eq!(summary.days_absent, 1);
        assert_eq!(summary.start_date, "2026-08-24");
        assert_eq!(summary.end_date, "2026-08-30");
    }
}
