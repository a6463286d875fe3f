//! Check-in/check-out decision logic.
//!
//! Everything here is a pure function over the request inputs plus the
//! read-only [`OfficePolicy`]; persistence happens in the API layer. The
//! per-day state machine is `NoRecord -> CheckedIn -> CheckedOut`; every
//! other transition is rejected with a distinct error so callers can render
//! different messages for policy violations, sequencing bugs, and data
//! corruption.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Value, json};

use crate::attendance::geo::{self, GeoPoint};
use crate::attendance::policy::OfficePolicy;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttendanceError {
    #[error("check-in denied: your address ({ip}) is not in the office network")]
    NetworkNotPermitted { ip: String },

    #[error("check-in denied: you are {distance_km:.2} km from the office (allowed: {allowed_km} km)")]
    OutsideGeofence { distance_km: f64, allowed_km: f64 },

    #[error("already checked in today")]
    DuplicateCheckIn,

    #[error("already checked out today")]
    DuplicateCheckOut,

    #[error("no check-in found for today")]
    MissingCheckIn,

    #[error("check-out at {check_out} precedes check-in at {check_in}")]
    NegativeWorkHours {
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
    },
}

impl AttendanceError {
    pub fn code(&self) -> &'static str {
        match self {
            AttendanceError::NetworkNotPermitted { .. } => "network_not_permitted",
            AttendanceError::OutsideGeofence { .. } => "outside_geofence",
            AttendanceError::DuplicateCheckIn => "duplicate_check_in",
            AttendanceError::DuplicateCheckOut => "duplicate_check_out",
            AttendanceError::MissingCheckIn => "missing_check_in",
            AttendanceError::NegativeWorkHours { .. } => "negative_work_hours",
        }
    }

    /// Machine-readable detail for the presentation layer.
    pub fn details(&self) -> Value {
        match self {
            AttendanceError::NetworkNotPermitted { ip } => json!({ "ip": ip }),
            AttendanceError::OutsideGeofence {
                distance_km,
                allowed_km,
            } => json!({ "distance_km": distance_km, "allowed_km": allowed_km }),
            AttendanceError::NegativeWorkHours {
                check_in,
                check_out,
            } => json!({ "check_in": check_in, "check_out": check_out }),
            _ => json!({}),
        }
    }
}

/// Canonical day key: exact-match `YYYY-MM-DD`, never a timestamp range.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Validate physical presence for a check-in attempt.
///
/// The IP allow-list is exact-match and checked first. The geofence applies
/// only when the office location is configured AND the attempt supplies
/// coordinates; GPS is optional, so missing coordinates pass through.
/// A distance exactly equal to the radius passes; only strictly greater is
/// rejected.
pub fn verify_location(
    policy: &OfficePolicy,
    source_ip: &str,
    claimed: Option<GeoPoint>,
) -> Result<(), AttendanceError> {
    if let Some(allowed) = &policy.allowed_ips {
        if !allowed.iter().any(|ip| ip == source_ip) {
            return Err(AttendanceError::NetworkNotPermitted {
                ip: source_ip.to_string(),
            });
        }
    }

    if let (Some(office), Some(point)) = (policy.office_location, claimed) {
        let distance_km = geo::haversine_km(point, office);
        if distance_km > policy.allowed_radius_km {
            return Err(AttendanceError::OutsideGeofence {
                distance_km,
                allowed_km: policy.allowed_radius_km,
            });
        }
    }

    Ok(())
}

/// Late if the check-in moment is at or after the cutoff; the boundary
/// itself counts as late.
pub fn classify_check_in(at: NaiveDateTime, late_after: NaiveTime) -> AttendanceStatus {
    if at.time() >= late_after {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

/// `NoRecord` may check in, and so may an existing row whose `check_in` is
/// still unset (a day materialized as absent ahead of time). A recorded
/// check-in is never overwritten.
pub fn ensure_can_check_in(existing: Option<&AttendanceRecord>) -> Result<(), AttendanceError> {
    match existing {
        Some(record) if record.check_in.is_some() => Err(AttendanceError::DuplicateCheckIn),
        _ => Ok(()),
    }
}

/// `CheckedIn` is the only state that may check out; returns the recorded
/// check-in moment for the work-hour computation.
pub fn ensure_can_check_out(
    existing: Option<&AttendanceRecord>,
) -> Result<NaiveDateTime, AttendanceError> {
    let record = existing.ok_or(AttendanceError::MissingCheckIn)?;
    let check_in = record.check_in.ok_or(AttendanceError::MissingCheckIn)?;
    if record.check_out.is_some() {
        return Err(AttendanceError::DuplicateCheckOut);
    }
    Ok(check_in)
}

/// Elapsed hours rounded to 2 decimals. A check-out before the check-in is
/// clock skew or data corruption and is surfaced as its own error, never
/// clamped to zero.
pub fn work_hours(
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
) -> Result<f64, AttendanceError> {
    let seconds = (check_out - check_in).num_seconds();
    if seconds < 0 {
        return Err(AttendanceError::NegativeWorkHours {
            check_in,
            check_out,
        });
    }
    let hours = seconds as f64 / 3600.0;
    Ok((hours * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn policy() -> OfficePolicy {
        OfficePolicy {
            allowed_ips: None,
            office_location: None,
            allowed_radius_km: 0.1,
            late_after: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 26)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn record(check_in: Option<NaiveDateTime>, check_out: Option<NaiveDateTime>) -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            employee_id: 42,
            date: "2026-08-26".into(),
            check_in,
            check_out,
            status: AttendanceStatus::Present,
            ip_address: None,
            lat: None,
            lng: None,
            work_hours: None,
        }
    }

    const OFFICE: GeoPoint = GeoPoint {
        lat: 40.0,
        lng: -73.0,
    };

    #[test]
    fn day_key_is_iso_date() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
        assert_eq!(day_key(d), "2026-08-26");
    }

    #[test]
    fn ip_allow_list_rejects_unknown_address() {
        let mut p = policy();
        p.allowed_ips = Some(vec!["10.0.0.1".into(), "10.0.0.2".into()]);
        p.office_location = Some(OFFICE);

        // Coordinates at the office would pass the geofence, but the IP
        // check comes first and wins.
        let err = verify_location(&p, "203.0.113.9", Some(OFFICE)).unwrap_err();
        assert_eq!(
            err,
            AttendanceError::NetworkNotPermitted {
                ip: "203.0.113.9".into()
            }
        );

        assert!(verify_location(&p, "10.0.0.2", Some(OFFICE)).is_ok());
    }

    #[test]
    fn geofence_rejects_only_strictly_beyond_radius() {
        let point = GeoPoint {
            lat: 40.0009,
            lng: -73.0,
        };
        let distance = geo::haversine_km(point, OFFICE);

        let mut p = policy();
        p.office_location = Some(OFFICE);

        // Exactly at the boundary passes.
        p.allowed_radius_km = distance;
        assert!(verify_location(&p, "10.0.0.1", Some(point)).is_ok());

        // Shrinking the radius a hair puts the point outside and rejects,
        // reporting both distances.
        p.allowed_radius_km = distance - 1e-6;
        match verify_location(&p, "10.0.0.1", Some(point)) {
            Err(AttendanceError::OutsideGeofence {
                distance_km,
                allowed_km,
            }) => {
                assert!((distance_km - distance).abs() < 1e-12);
                assert!((allowed_km - p.allowed_radius_km).abs() < 1e-12);
            }
            other => panic!("expected geofence rejection, got {other:?}"),
        }
    }

    #[test]
    fn geofence_skipped_when_no_coordinates_supplied() {
        let mut p = policy();
        p.office_location = Some(OFFICE);
        p.allowed_ips = Some(vec!["10.0.0.1".into()]);

        // No coordinates: geofence passes silently, IP still applies.
        assert!(verify_location(&p, "10.0.0.1", None).is_ok());
        assert!(matches!(
            verify_location(&p, "198.51.100.4", None),
            Err(AttendanceError::NetworkNotPermitted { .. })
        ));
    }

    #[test]
    fn late_boundary_counts_as_late() {
        let cutoff = NaiveTime::from_hms_opt(9, 15, 0).unwrap();
        assert_eq!(
            classify_check_in(at(9, 15, 0), cutoff),
            AttendanceStatus::Late
        );
        assert_eq!(
            classify_check_in(at(9, 14, 59), cutoff),
            AttendanceStatus::Present
        );
        assert_eq!(
            classify_check_in(at(14, 0, 0), cutoff),
            AttendanceStatus::Late
        );
    }

    #[test]
    fn materialized_absent_row_can_still_check_in() {
        assert!(ensure_can_check_in(Some(&record(None, None))).is_ok());
    }

    #[test]
    fn second_check_in_is_rejected() {
        assert!(ensure_can_check_in(None).is_ok());
        assert_eq!(
            ensure_can_check_in(Some(&record(Some(at(9, 0, 0)), None))),
            Err(AttendanceError::DuplicateCheckIn)
        );
        assert_eq!(
            ensure_can_check_in(Some(&record(Some(at(9, 0, 0)), Some(at(17, 0, 0))))),
            Err(AttendanceError::DuplicateCheckIn)
        );
    }

    #[test]
    fn check_out_requires_a_prior_check_in() {
        assert_eq!(
            ensure_can_check_out(None),
            Err(AttendanceError::MissingCheckIn)
        );
        assert_eq!(
            ensure_can_check_out(Some(&record(None, None))),
            Err(AttendanceError::MissingCheckIn)
        );
        assert_eq!(
            ensure_can_check_out(Some(&record(Some(at(9, 0, 0)), Some(at(17, 0, 0))))),
            Err(AttendanceError::DuplicateCheckOut)
        );
        assert_eq!(
            ensure_can_check_out(Some(&record(Some(at(9, 0, 0)), None))),
            Ok(at(9, 0, 0))
        );
    }

    #[test]
    fn work_hours_rounds_to_two_decimals() {
        assert_eq!(work_hours(at(9, 0, 0), at(17, 30, 0)), Ok(8.5));
        assert_eq!(work_hours(at(9, 2, 11), at(17, 30, 0)), Ok(8.46));
        assert_eq!(work_hours(at(9, 0, 0), at(9, 0, 0)), Ok(0.0));
    }

    #[test]
    fn negative_duration_is_an_error_not_zero() {
        assert_eq!(
            work_hours(at(17, 0, 0), at(9, 0, 0)),
            Err(AttendanceError::NegativeWorkHours {
                check_in: at(17, 0, 0),
                check_out: at(9, 0, 0),
            })
        );
    }
}
