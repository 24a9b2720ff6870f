//! Imagery visualisation and tile layers
//!
//! The imagery service renders tiles itself; all this side needs is the
//! stretch/palette to ask for and the URL template it hands back.

use serde::{Deserialize, Serialize};

/// Sentinel-2 bands shown in the true-colour layer (red, green, blue)
pub const RGB_BANDS: [&str; 3] = ["B4", "B3", "B2"];

/// Colour ramp for the NDVI layer, low to high
pub const NDVI_PALETTE: [&str; 3] = ["blue", "white", "green"];

/// How the service should stretch and colour an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    /// Bands to render; empty renders the image's own bands
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<String>,
    /// Value mapped to the bottom of the ramp
    pub min: f64,
    /// Value mapped to the top of the ramp
    pub max: f64,
    /// CSS colour names or hex strings for single-band images
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<String>,
}

impl VisParams {
    /// True-colour composite of reflectance scaled to 0..1
    pub fn rgb() -> Self {
        Self {
            bands: RGB_BANDS.iter().map(|b| b.to_string()).collect(),
            min: 0.0,
            max: 0.3,
            palette: Vec::new(),
        }
    }

    /// NDVI ramp starting at the vegetation threshold
    pub fn ndvi(threshold: f64) -> Self {
        Self {
            bands: Vec::new(),
            min: threshold,
            max: 1.0,
            palette: NDVI_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// A remote XYZ tile layer ready for the browser map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    /// URL with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    /// Credit line shown on the map
    pub attribution: String,
    /// Name shown in the layer control
    pub name: String,
}

impl TileLayer {
    pub fn new(
        url_template: impl Into<String>,
        attribution: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            url_template: url_template.into(),
            attribution: attribution.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_preset() {
        let vis = VisParams::rgb();
        assert_eq!(vis.bands, vec!["B4", "B3", "B2"]);
        assert_eq!((vis.min, vis.max), (0.0, 0.3));
        assert!(vis.palette.is_empty());
    }

    #[test]
    fn test_ndvi_preset_starts_at_threshold() {
        let vis = VisParams::ndvi(0.42);
        assert_eq!(vis.min, 0.42);
        assert_eq!(vis.max, 1.0);
        assert_eq!(vis.palette, vec!["blue", "white", "green"]);
    }
}
