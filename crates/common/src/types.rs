//! Common data types for Medica components.

use serde::{Deserialize, Serialize};

/// A point on the Earth's surface in decimal degrees.
///
/// No range validation is performed: latitude is expected in [-90, 90] and
/// longitude in [-180, 180], but out-of-range values are carried as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Create a point from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Account role carried in identity tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Patient looking for doctors and medicines.
    Patient,
    /// Doctor with a public profile.
    Doctor,
    /// Pharmacy owner managing stock.
    Pharmacy,
    /// Marketplace administrator.
    Admin,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Pharmacy => "pharmacy",
            Role::Admin => "admin",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::Pharmacy).unwrap();
        assert_eq!(json, "\"pharmacy\"");

        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_role_as_str_matches_serde() {
        for role in [Role::Patient, Role::Doctor, Role::Pharmacy, Role::Admin] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json.trim_matches('"'), role.as_str());
        }
    }

    #[test]
    fn test_geo_point_new() {
        let p = GeoPoint::new(48.8566, 2.3522);
        assert!((p.lat - 48.8566).abs() < f64::EPSILON);
        assert!((p.lng - 2.3522).abs() < f64::EPSILON);
    }
}
