//! Reading region reductions back into numbers

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Band name given to the NDVI image
pub const NDVI_BAND: &str = "NDVI";

/// Share of vegetated pixels, in percent
///
/// Zero when there are no pixels to count.
pub fn vegetation_percentage(vegetated: f64, total: f64) -> f64 {
    if total > 0.0 && total.is_finite() {
        vegetated / total * 100.0
    } else {
        0.0
    }
}

/// A numeric entry of a reduction dictionary, or `default` when the key is
/// missing or null
pub fn band_value(reduction: &Value, key: &str, default: f64) -> f64 {
    reduction.get(key).and_then(Value::as_f64).unwrap_or(default)
}

/// Min/max/mean of the vegetation-only NDVI
///
/// A value is `None` when every pixel in the region was masked out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NdviStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl NdviStats {
    /// Read the `NDVI_min`, `NDVI_max` and `NDVI_mean` keys of a combined
    /// min/max + mean reduction
    pub fn from_reduction(reduction: &Value) -> Self {
        let read = |suffix: &str| {
            reduction
                .get(format!("{NDVI_BAND}_{suffix}"))
                .and_then(Value::as_f64)
        };
        Self {
            min: read("min"),
            max: read("max"),
            mean: read("mean"),
        }
    }
}
