//! Geographic coordinates
//!
//! Positions on the globe expressed in the WGS84 datum, the system used by the
//! geocoder, the imagery service and the browser map alike.

use serde::{Deserialize, Serialize};

/// Geographic coordinate using WGS84 datum (latitude/longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoord {
    /// Latitude in degrees (-90 to 90, positive = north)
    pub lat: f64,
    /// Longitude in degrees (-180 to 180, positive = east)
    pub lon: f64,
}

impl GeoCoord {
    /// Create a new geographic coordinate
    ///
    /// # Arguments
    /// * `lat` - Latitude in degrees (-90 to 90)
    /// * `lon` - Longitude in degrees (-180 to 180)
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check if the coordinate is within valid ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    /// Coordinate as a GeoJSON position (`[lon, lat]`)
    pub fn to_position(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl Default for GeoCoord {
    /// Centre of Brazil, where the map opens before any search
    fn default() -> Self {
        Self {
            lat: -14.2,
            lon: -51.9,
        }
    }
}
