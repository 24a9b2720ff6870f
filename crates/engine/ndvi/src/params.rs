//! User-chosen analysis parameters and their guards

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vegscope_map::GeoCoord;

use crate::error::{AnalysisError, Result};

/// Inputs from the sidebar: date range, thresholds and the map centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// First acquisition day (inclusive)
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    /// Last day of the range; acquisitions on this day are excluded
    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,
    /// Maximum `CLOUDY_PIXEL_PERCENTAGE` (exclusive), 0..=100
    #[serde(default = "default_cloud_limit")]
    pub cloud_limit: f64,
    /// Minimum NDVI counted as vegetation, 0.0..=1.0
    #[serde(default = "default_ndvi_threshold")]
    pub ndvi_threshold: f64,
    /// Centre of the search area
    #[serde(default)]
    pub center: GeoCoord,
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 31).unwrap_or(NaiveDate::MIN)
}

fn default_cloud_limit() -> f64 {
    30.0
}

fn default_ndvi_threshold() -> f64 {
    0.3
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            end_date: default_end_date(),
            cloud_limit: default_cloud_limit(),
            ndvi_threshold: default_ndvi_threshold(),
            center: GeoCoord::default(),
        }
    }
}

impl AnalysisParams {
    /// Reject values the sidebar controls could never produce
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.ndvi_threshold) {
            return Err(AnalysisError::NdviThresholdOutOfRange(self.ndvi_threshold));
        }
        if !(0.0..=100.0).contains(&self.cloud_limit) {
            return Err(AnalysisError::CloudLimitOutOfRange(self.cloud_limit));
        }
        if !self.center.is_valid() {
            return Err(AnalysisError::InvalidCenter {
                lat: self.center.lat,
                lon: self.center.lon,
            });
        }
        if self.start_date > self.end_date {
            return Err(AnalysisError::InvertedDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    pub fn start(&self) -> String {
        self.start_date.format("%Y-%m-%d").to_string()
    }

    pub fn end(&self) -> String {
        self.end_date.format("%Y-%m-%d").to_string()
    }
}
