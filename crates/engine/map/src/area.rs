//! Bounding boxes
//!
//! Used to fit the result map to the region the user drew.

use serde::{Deserialize, Serialize};

use crate::coords::GeoCoord;
use crate::geometry::Position;

/// A rectangular area defined in geographic coordinates (bounding box)
///
/// The area is defined by its southwest (minimum) and northeast (maximum) corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    /// Southwest corner (minimum lat/lon)
    pub min: GeoCoord,
    /// Northeast corner (maximum lat/lon)
    pub max: GeoCoord,
}

impl Area {
    /// The whole valid coordinate range
    pub const WORLD: Area = Area {
        min: GeoCoord {
            lat: -90.0,
            lon: -180.0,
        },
        max: GeoCoord {
            lat: 90.0,
            lon: 180.0,
        },
    };

    /// Create a new area from southwest and northeast corners
    pub fn new(min: GeoCoord, max: GeoCoord) -> Self {
        Self { min, max }
    }

    /// Smallest area containing every `[lon, lat]` position
    ///
    /// Returns `None` for an empty sequence.
    pub fn from_positions<'a>(positions: impl IntoIterator<Item = &'a Position>) -> Option<Self> {
        let mut iter = positions.into_iter();
        let &[lon, lat] = iter.next()?;
        let mut area = Area::new(GeoCoord::new(lat, lon), GeoCoord::new(lat, lon));

        for &[lon, lat] in iter {
            area.min.lat = area.min.lat.min(lat);
            area.min.lon = area.min.lon.min(lon);
            area.max.lat = area.max.lat.max(lat);
            area.max.lon = area.max.lon.max(lon);
        }

        Some(area)
    }

    /// Check if the area bounds are valid
    pub fn is_valid(&self) -> bool {
        self.min.is_valid()
            && self.max.is_valid()
            && self.min.lat <= self.max.lat
            && self.min.lon <= self.max.lon
    }

    /// Get the center point of the area
    pub fn center(&self) -> GeoCoord {
        GeoCoord::new(
            (self.min.lat + self.max.lat) / 2.0,
            (self.min.lon + self.max.lon) / 2.0,
        )
    }

    /// Check if a point is contained within this area
    ///
    /// Edges count as inside; NaN coordinates never do.
    pub fn contains(&self, point: &GeoCoord) -> bool {
        point.lat >= self.min.lat
            && point.lat <= self.max.lat
            && point.lon >= self.min.lon
            && point.lon <= self.max.lon
    }

    /// Corners in the `[[south, west], [north, east]]` order map widgets expect
    pub fn to_lat_lng_bounds(&self) -> [[f64; 2]; 2] {
        [
            [self.min.lat, self.min.lon],
            [self.max.lat, self.max.lon],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_from_positions() {
        let ring: Vec<Position> = vec![
            [-48.0, -16.0],
            [-47.0, -16.5],
            [-47.5, -15.0],
            [-48.0, -16.0],
        ];
        let area = Area::from_positions(&ring).unwrap();

        assert!(area.is_valid());
        assert_eq!(area.center(), GeoCoord::new(-15.75, -47.5));
        assert_eq!(area.min, GeoCoord::new(-16.5, -48.0));
        assert_eq!(area.max, GeoCoord::new(-15.0, -47.0));
        assert_eq!(area.to_lat_lng_bounds(), [[-16.5, -48.0], [-15.0, -47.0]]);
    }

    #[test]
    fn test_area_from_no_positions() {
        let ring: Vec<Position> = Vec::new();
        assert!(Area::from_positions(&ring).is_none());
    }

    #[test]
    fn test_area_contains() {
        let area = Area::new(GeoCoord::new(45.0, -123.0), GeoCoord::new(46.0, -122.0));

        assert!(area.contains(&GeoCoord::new(45.5, -122.5)));
        assert!(area.contains(&GeoCoord::new(45.0, -123.0))); // Corner
        assert!(!area.contains(&GeoCoord::new(44.9, -122.5))); // Outside
        assert!(!area.contains(&GeoCoord::new(f64::NAN, -122.5)));
    }

    #[test]
    fn test_inverted_area_is_invalid() {
        let area = Area::new(GeoCoord::new(46.0, -122.0), GeoCoord::new(45.0, -123.0));
        assert!(!area.is_valid());
        assert!(Area::WORLD.is_valid());
        assert!(Area::WORLD.contains(&GeoCoord::new(-90.0, 180.0)));
    }
}
