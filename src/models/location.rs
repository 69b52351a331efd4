//! Geographic point model

use serde::{Deserialize, Serialize};

/// Location coordinates in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create a new coordinate pair
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }

    /// Stable key fragment for this point
    #[must_use]
    pub fn to_key(&self) -> String {
        let (lat, lon) = self.rounded(4);
        format!("{lat:.4}:{lon:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_coordinates() {
        let point = Coordinates::new(12.971_634, 77.594_566);
        let (lat, lon) = point.rounded(2);
        assert_eq!(lat, 12.97);
        assert_eq!(lon, 77.59);
    }

    #[test]
    fn test_key_is_stable() {
        let point = Coordinates::new(12.9716, 77.5946);
        assert_eq!(point.to_key(), "12.9716:77.5946");
    }
}
