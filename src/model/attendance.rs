use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Daily attendance status, fixed at check-in and never revised at check-out.
/// Stored as its snake_case tag in the `status` column.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

/// One row per (employee, calendar day), enforced by a
/// `UNIQUE (employee_id, date)` index.
///
/// `date` is the canonical `YYYY-MM-DD` key rather than a timestamp, so the
/// daily lookup is an exact match instead of a range query. `ip_address` and
/// `lat`/`lng` record the provenance of the check-in attempt for audit and
/// are never re-validated after the fact.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 42,
    "date": "2026-08-26",
    "check_in": "2026-08-26T09:02:11",
    "check_out": "2026-08-26T17:30:00",
    "status": "present",
    "ip_address": "203.0.113.7",
    "lat": 40.7128,
    "lng": -74.0060,
    "work_hours": 8.46
}))]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2026-08-26")]
    pub date: String,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub check_in: Option<NaiveDateTime>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub check_out: Option<NaiveDateTime>,
    #[schema(example = "present")]
    pub status: AttendanceStatus,
    pub ip_address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub work_hours: Option<f64>,
}
