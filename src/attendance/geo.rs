use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    #[schema(example = 40.7128)]
    pub lat: f64,
    #[schema(example = -74.0060)]
    pub lng: f64,
}

/// Great-circle distance in kilometers between two points given in degrees.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFICE: GeoPoint = GeoPoint {
        lat: 40.0,
        lng: -73.0,
    };

    #[test]
    fn zero_distance_at_identical_points() {
        assert_eq!(haversine_km(OFFICE, OFFICE), 0.0);
    }

    #[test]
    fn symmetric() {
        let p = GeoPoint {
            lat: 41.2,
            lng: -72.5,
        };
        assert_eq!(haversine_km(OFFICE, p), haversine_km(p, OFFICE));
    }

    #[test]
    fn tenth_of_a_degree_of_latitude_at_the_equator() {
        let a = GeoPoint { lat: 0.0, lng: 0.0 };
        let b = GeoPoint { lat: 0.1, lng: 0.0 };
        let d = haversine_km(a, b);
        // One degree of latitude is ~111.19 km on a 6371 km sphere.
        assert!((d - 11.1).abs() < 0.05, "got {d}");
    }

    #[test]
    fn respects_triangle_inequality() {
        let a = GeoPoint { lat: 0.0, lng: 0.0 };
        let b = GeoPoint { lat: 0.3, lng: 0.2 };
        let c = GeoPoint { lat: 0.1, lng: 0.4 };
        assert!(haversine_km(a, c) <= haversine_km(a, b) + haversine_km(b, c) + 1e-9);
    }
}
