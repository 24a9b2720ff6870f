//! Geospatial value types for vegscope
//!
//! This crate holds the plain data the rest of the workspace passes around:
//! coordinates, bounding boxes, GeoJSON regions drawn by the user, the
//! per-session drawing state, and descriptors for remote tile layers.
//!
//! # Modules
//!
//! - [`coords`]: Geographic coordinates (WGS84 lat/lon)
//! - [`area`]: Bounding boxes used to fit map views
//! - [`geometry`]: GeoJSON polygons and drawn shapes
//! - [`drawings`]: Session-scoped list of drawn shapes
//! - [`imagery`]: Visualisation presets and tile layer descriptors

pub mod area;
pub mod coords;
pub mod drawings;
pub mod geometry;
pub mod imagery;

pub use area::Area;
pub use coords::GeoCoord;
pub use drawings::DrawingSession;
pub use geometry::{Drawing, Geometry, GeometryError, Position, Ring};
pub use imagery::{TileLayer, VisParams};
