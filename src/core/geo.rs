use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are finite and within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Represents a bounding box of geographical coordinates.
///
/// Serialized with the short `ne` / `sw` keys used by pack contexts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    #[serde(rename = "ne")]
    pub north_east: LatLng,
    #[serde(rename = "sw")]
    pub south_west: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            north_east,
            south_west,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// Both corners are valid coordinates and the south-west corner is not north of the north-east one
    pub fn is_valid(&self) -> bool {
        self.north_east.is_valid()
            && self.south_west.is_valid()
            && self.south_west.lat <= self.north_east.lat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(52.5, -1.9);
        assert_eq!(coord.lat, 52.5);
        assert_eq!(coord.lng, -1.9);
        assert!(coord.is_valid());
    }

    #[test]
    fn test_lat_lng_validity() {
        assert!(!LatLng::new(999.0, 0.0).is_valid());
        assert!(!LatLng::new(0.0, -180.5).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
        assert!(LatLng::new(-90.0, 180.0).is_valid());
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = LatLngBounds::from_coords(52.0, -2.5, 53.0, -1.0);
        assert!(bounds.contains(&LatLng::new(52.5, -1.9)));
        assert!(!bounds.contains(&LatLng::new(54.0, -1.9)));
        assert_eq!(bounds.center(), LatLng::new(52.5, -1.75));
    }

    #[test]
    fn test_bounds_wire_keys() {
        let bounds = LatLngBounds::from_coords(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&bounds).unwrap();
        assert_eq!(json, r#"{"ne":{"lat":3.0,"lng":4.0},"sw":{"lat":1.0,"lng":2.0}}"#);
    }
}
