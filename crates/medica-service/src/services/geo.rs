//! Great-circle distance.

use common::types::GeoPoint;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres.
///
/// Coordinates are not range-checked; out-of-range input yields a defined
/// but meaningless distance.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 1 decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS: GeoPoint = GeoPoint::new(48.8566, 2.3522);
    const LONDON: GeoPoint = GeoPoint::new(51.5074, -0.1278);

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(haversine_km(PARIS, PARIS), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let there = haversine_km(PARIS, LONDON);
        let back = haversine_km(LONDON, PARIS);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_paris_london() {
        let d = haversine_km(PARIS, LONDON);
        assert!((d - 343.5).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_antipodes_is_half_circumference() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_input_does_not_fault() {
        let d = haversine_km(GeoPoint::new(500.0, -720.0), PARIS);
        assert!(d.is_finite());
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(1.235_000_1), 1.24);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round1(4.25), 4.3);
        assert_eq!(round1(3.04), 3.0);
    }
}
