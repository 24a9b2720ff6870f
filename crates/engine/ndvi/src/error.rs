//! Error types for NDVI analysis

use chrono::NaiveDate;
use vegscope_map::GeometryError;

/// Everything that ends an analysis request early
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// NDVI threshold outside [0, 1]
    #[error("NDVI threshold must be between 0.0 and 1.0, got {0}")]
    NdviThresholdOutOfRange(f64),

    /// Cloud-cover ceiling outside [0, 100]
    #[error("Cloud-cover limit must be between 0 and 100, got {0}")]
    CloudLimitOutOfRange(f64),

    /// Search centre outside WGS84 ranges
    #[error("Map centre must be a valid latitude/longitude, got ({lat}, {lon})")]
    InvalidCenter { lat: f64, lon: f64 },

    /// Start date after end date
    #[error("Start date {start} is after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    /// The date/cloud filter matched no images
    #[error("No Sentinel-2 images found with cloud cover <= {cloud_limit}%. Try raising the limit or changing the dates.")]
    NoImagery { cloud_limit: f64 },

    /// The drawn region cannot be used
    #[error("Error processing geometry: {0}")]
    Geometry(#[from] GeometryError),

    /// The service failed while working on the drawn region
    #[error("Error processing geometry: {0}")]
    Region(#[source] vegscope_earthengine::Error),

    /// The imagery service could not be initialised
    #[error("Error initialising Earth Engine: {0}")]
    Unavailable(String),

    /// The imagery service failed mid-request
    #[error("Earth Engine request failed: {0}")]
    Service(#[from] vegscope_earthengine::Error),
}

impl AnalysisError {
    /// Whether the error comes from user input rather than the service
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AnalysisError::NdviThresholdOutOfRange(_)
                | AnalysisError::CloudLimitOutOfRange(_)
                | AnalysisError::InvalidCenter { .. }
                | AnalysisError::InvertedDateRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
