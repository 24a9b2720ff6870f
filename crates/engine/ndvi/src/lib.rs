//! NDVI analysis for vegscope
//!
//! Turns sidebar parameters and a drawn region into requests against the
//! imagery service, and the service's answers into the numbers shown to the
//! user. No pixels are processed locally.
//!
//! # Modules
//!
//! - [`params`]: Date range and threshold inputs with their guards
//! - [`stats`]: Vegetation percentage and NDVI summary
//! - [`backend`]: Trait over the imagery service
//! - [`pipeline`]: Scene preparation and region analysis

pub mod backend;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod stats;

pub use backend::ImageryBackend;
pub use error::{AnalysisError, Result};
pub use params::AnalysisParams;
pub use pipeline::{Analyzer, RegionOutcome, RegionReport, Scene};
pub use stats::{vegetation_percentage, NdviStats};
