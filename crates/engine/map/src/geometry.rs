//! GeoJSON regions drawn by the user
//!
//! The browser draw tool hands back GeoJSON features. Only polygonal shapes
//! (polygons and rectangles, which arrive as polygons) can be analysed, so the
//! geometry model is limited to `Polygon` and `MultiPolygon`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::area::Area;
use crate::coords::GeoCoord;

/// A GeoJSON position, `[lon, lat]` in degrees
pub type Position = [f64; 2];

/// An ordered, closed sequence of positions
pub type Ring = Vec<Position>;

/// Errors raised while reading a drawn geometry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// The `type` member names a geometry this tool cannot analyse
    #[error("unsupported geometry type: {0}")]
    Unsupported(String),

    /// The geometry object is not valid GeoJSON
    #[error("malformed geometry: {0}")]
    Malformed(String),

    /// A ring is open or has fewer than four positions
    #[error("ring {index} is not a closed linear ring")]
    OpenRing { index: usize },

    /// A position lies outside WGS84 bounds
    #[error("position out of range: [{lon}, {lat}]")]
    OutOfRange { lon: f64, lat: f64 },

    /// The geometry has no positions at all
    #[error("geometry has no coordinates")]
    Empty,
}

/// Polygonal GeoJSON geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Outer ring followed by any holes
    Polygon { coordinates: Vec<Ring> },
    /// Several polygons, each an outer ring followed by holes
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
}

impl Geometry {
    /// Build a single-ring polygon, closing the ring if needed
    pub fn polygon(mut ring: Ring) -> Self {
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
            if first != last {
                ring.push(first);
            }
        }
        Geometry::Polygon {
            coordinates: vec![ring],
        }
    }

    /// Parse and validate a GeoJSON geometry object
    pub fn from_value(value: &Value) -> Result<Self, GeometryError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| GeometryError::Malformed("missing \"type\" member".into()))?;

        if kind != "Polygon" && kind != "MultiPolygon" {
            return Err(GeometryError::Unsupported(kind.to_string()));
        }

        let geometry: Geometry = serde_json::from_value(value.clone())
            .map_err(|e| GeometryError::Malformed(e.to_string()))?;
        geometry.validate()?;
        Ok(geometry)
    }

    /// Check ring closure and coordinate ranges
    pub fn validate(&self) -> Result<(), GeometryError> {
        let mut any = false;
        for (index, ring) in self.rings().enumerate() {
            if ring.len() < 4 || ring.first() != ring.last() {
                return Err(GeometryError::OpenRing { index });
            }
            for &[lon, lat] in ring {
                if !Area::WORLD.contains(&GeoCoord::new(lat, lon)) {
                    return Err(GeometryError::OutOfRange { lon, lat });
                }
            }
            any = true;
        }
        if any {
            Ok(())
        } else {
            Err(GeometryError::Empty)
        }
    }

    /// Iterate every ring of every polygon
    pub fn rings(&self) -> Box<dyn Iterator<Item = &Ring> + '_> {
        match self {
            Geometry::Polygon { coordinates } => Box::new(coordinates.iter()),
            Geometry::MultiPolygon { coordinates } => {
                Box::new(coordinates.iter().flat_map(|polygon| polygon.iter()))
            }
        }
    }

    /// Bounding box of all positions; `None` when empty or out of range
    pub fn bounds(&self) -> Option<Area> {
        Area::from_positions(self.rings().flatten()).filter(Area::is_valid)
    }

    /// GeoJSON `type` member
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }
}

/// A shape as reported by the browser draw tool
///
/// Kept as raw JSON so that whatever the widget sends is stored untouched; the
/// geometry is only interpreted when an analysis is requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Drawing(pub Value);

impl Drawing {
    /// Whether the drawing carries a `"geometry"` key
    pub fn has_geometry(&self) -> bool {
        self.0.get("geometry").is_some()
    }

    /// The drawing's geometry
    ///
    /// Returns `None` when there is no `"geometry"` key; a present but unusable
    /// geometry (including `null`) is an error.
    pub fn geometry(&self) -> Option<Result<Geometry, GeometryError>> {
        self.0.get("geometry").map(Geometry::from_value)
    }
}

impl From<Geometry> for Drawing {
    fn from(geometry: Geometry) -> Self {
        Drawing(serde_json::json!({
            "type": "Feature",
            "properties": {},
            "geometry": geometry,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[-48.0, -16.0], [-47.0, -16.0], [-47.0, -15.0], [-48.0, -15.0], [-48.0, -16.0]]]
        })
    }

    #[test]
    fn test_parse_polygon() {
        let geometry = Geometry::from_value(&square()).unwrap();
        assert_eq!(geometry.kind(), "Polygon");
        assert_eq!(geometry.rings().count(), 1);
    }

    #[test]
    fn test_parse_multipolygon() {
        let value = json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                [[[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 2.0]]]
            ]
        });
        let geometry = Geometry::from_value(&value).unwrap();
        assert_eq!(geometry.rings().count(), 2);
        let bounds = geometry.bounds().unwrap();
        assert_eq!(bounds.min.lon, 0.0);
        assert_eq!(bounds.max.lat, 3.0);
    }

    #[test]
    fn test_point_is_unsupported() {
        let value = json!({"type": "Point", "coordinates": [0.0, 0.0]});
        assert_eq!(
            Geometry::from_value(&value),
            Err(GeometryError::Unsupported("Point".into()))
        );
    }

    #[test]
    fn test_open_ring_rejected() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]
        });
        assert_eq!(
            Geometry::from_value(&value),
            Err(GeometryError::OpenRing { index: 0 })
        );
    }

    #[test]
    fn test_out_of_range_rejected() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [200.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        });
        assert!(matches!(
            Geometry::from_value(&value),
            Err(GeometryError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_empty_polygon_rejected() {
        let value = json!({"type": "Polygon", "coordinates": []});
        assert_eq!(Geometry::from_value(&value), Err(GeometryError::Empty));
    }

    #[test]
    fn test_polygon_constructor_closes_ring() {
        let geometry = Geometry::polygon(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        assert!(geometry.validate().is_ok());
    }

    #[test]
    fn test_drawing_without_geometry_key() {
        let drawing = Drawing(json!({"type": "Feature", "properties": {}}));
        assert!(!drawing.has_geometry());
        assert!(drawing.geometry().is_none());
    }

    #[test]
    fn test_drawing_with_null_geometry_is_error() {
        let drawing = Drawing(json!({"type": "Feature", "geometry": null}));
        assert!(drawing.has_geometry());
        assert!(matches!(
            drawing.geometry(),
            Some(Err(GeometryError::Malformed(_)))
        ));
    }

    #[test]
    fn test_drawing_with_geometry() {
        let drawing = Drawing(json!({"type": "Feature", "properties": {}, "geometry": square()}));
        let geometry = drawing.geometry().unwrap().unwrap();
        assert_eq!(geometry.kind(), "Polygon");
    }
}
