use std::env;

use chrono::NaiveTime;

use crate::attendance::geo::GeoPoint;

/// Process-wide attendance policy, loaded once at startup and immutable
/// thereafter.
///
/// Both location controls are optional: without `allowed_ips` the network
/// check is skipped, without `office_location` the geofence is skipped.
#[derive(Debug, Clone)]
pub struct OfficePolicy {
    /// Exact-match source addresses permitted to check in.
    pub allowed_ips: Option<Vec<String>>,
    pub office_location: Option<GeoPoint>,
    pub allowed_radius_km: f64,
    /// Local wall-clock cutoff; a check-in at or after this time is late.
    pub late_after: NaiveTime,
}

impl OfficePolicy {
    pub fn from_env() -> Self {
        let allowed_ips = env::var("OFFICE_IPS").ok().map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        let office_location = match (env::var("OFFICE_LAT"), env::var("OFFICE_LNG")) {
            (Ok(lat), Ok(lng)) => Some(GeoPoint {
                lat: lat.parse().expect("OFFICE_LAT must be a number"),
                lng: lng.parse().expect("OFFICE_LNG must be a number"),
            }),
            _ => None,
        };

        let allowed_radius_km = env::var("OFFICE_RADIUS_KM")
            .unwrap_or_else(|_| "0.1".to_string())
            .parse()
            .expect("OFFICE_RADIUS_KM must be a number");

        let late_hour: u32 = env::var("LATE_AFTER_HOUR")
            .unwrap_or_else(|_| "9".to_string())
            .parse()
            .expect("LATE_AFTER_HOUR must be a number");
        let late_minute: u32 = env::var("LATE_AFTER_MINUTE")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .expect("LATE_AFTER_MINUTE must be a number");

        Self {
            allowed_ips,
            office_location,
            allowed_radius_km,
            late_after: NaiveTime::from_hms_opt(late_hour, late_minute, 0)
                .expect("LATE_AFTER_HOUR/LATE_AFTER_MINUTE out of range"),
        }
    }
}
