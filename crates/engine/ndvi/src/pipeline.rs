//! Scene preparation and region analysis
//!
//! A *scene* is the cloud-filtered Sentinel-2 median composite around the
//! map centre. Preparing it costs one remote call (the image count); when the
//! count is zero the request stops there. Analysing a region clips the
//! composite to the drawn polygon, derives NDVI and asks the service for a
//! tile layer plus three pixel reductions and the polygon's area.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use vegscope_earthengine::{Computed, EeGeometry, Filter, Image, ImageCollection, Reducer};
use vegscope_map::{DrawingSession, GeoCoord, Geometry, GeometryError, TileLayer, VisParams};

use crate::backend::ImageryBackend;
use crate::error::{AnalysisError, Result};
use crate::params::AnalysisParams;
use crate::stats::{band_value, vegetation_percentage, NdviStats, NDVI_BAND};

/// Sentinel-2 surface reflectance, harmonised across processing baselines
pub const COLLECTION_ID: &str = "COPERNICUS/S2_SR_HARMONIZED";

/// Per-image cloud metadata used for filtering
pub const CLOUD_PROPERTY: &str = "CLOUDY_PIXEL_PERCENTAGE";

/// Radius around the map centre searched for imagery
pub const ROI_BUFFER_M: f64 = 1_000_000.0;

/// Surface reflectance is stored as integers scaled by this factor
pub const REFLECTANCE_SCALE: f64 = 10_000.0;

/// Sampling resolution of every region reduction
pub const REDUCTION_SCALE_M: f64 = 10.0;

/// Pixel ceiling for region reductions
pub const MAX_PIXELS: f64 = 1e9;

/// Credit lines of the two layers
pub const RGB_ATTRIBUTION: &str = "Sentinel-2 via Google Earth Engine";
pub const NDVI_ATTRIBUTION: &str = "NDVI via Google Earth Engine";

/// Near-infrared and red bands
pub const NIR_BAND: &str = "B8";
pub const RED_BAND: &str = "B4";

/// Filtered composite ready for display or analysis
#[derive(Debug, Clone)]
pub struct Scene {
    pub params: AnalysisParams,
    pub image_count: u64,
    composite: Image,
}

impl Scene {
    /// Median composite in reflectance units, clipped to the search area
    pub fn composite(&self) -> &Image {
        &self.composite
    }
}

/// Everything shown for an analysed region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionReport {
    pub ndvi_layer: TileLayer,
    /// `[[south, west], [north, east]]` for fitting the result map
    pub bounds: [[f64; 2]; 2],
    /// Middle of the region's bounding box
    pub center: GeoCoord,
    /// Polygon area in square meters
    pub area_m2: Option<f64>,
    pub total_pixels: f64,
    pub vegetation_pixels: f64,
    pub vegetation_percentage: f64,
    pub stats: NdviStats,
    pub threshold: f64,
}

/// Result of analysing whatever the session has drawn
#[derive(Debug, Clone, PartialEq)]
pub enum RegionOutcome {
    /// Nothing usable has been drawn yet
    NotDrawn,
    Analysed {
        image_count: u64,
        report: Box<RegionReport>,
    },
}

/// Search area: a buffered point around the map centre
pub fn search_area(center: GeoCoord) -> EeGeometry {
    EeGeometry::point(center).buffer(ROI_BUFFER_M)
}

/// Sentinel-2 images matching the date range, search area and cloud limit
pub fn filtered_collection(params: &AnalysisParams, roi: &EeGeometry) -> ImageCollection {
    ImageCollection::load(COLLECTION_ID)
        .filter_date(&params.start(), &params.end())
        .filter_bounds(roi)
        .filter(Filter::lt(CLOUD_PROPERTY, params.cloud_limit))
}

/// Drives the imagery service for one request at a time
#[derive(Clone)]
pub struct Analyzer {
    backend: Arc<dyn ImageryBackend>,
}

impl Analyzer {
    pub fn new(backend: Arc<dyn ImageryBackend>) -> Self {
        Self { backend }
    }

    /// Validate parameters, count matching images and build the composite
    ///
    /// Fails with [`AnalysisError::NoImagery`] when nothing matches; no
    /// composite is built in that case.
    pub async fn scene(&self, params: &AnalysisParams) -> Result<Scene> {
        params.validate()?;

        let roi = search_area(params.center);
        let collection = filtered_collection(params, &roi);

        let count = self.backend.compute(collection.size().to_expression()).await?;
        let image_count = count.as_f64().ok_or_else(|| {
            vegscope_earthengine::Error::UnexpectedFormat(format!("image count was {count}"))
        })? as u64;

        tracing::debug!(
            "{} image(s) between {} and {} under {}% cloud",
            image_count,
            params.start(),
            params.end(),
            params.cloud_limit
        );

        if image_count == 0 {
            tracing::warn!(
                "No imagery for {}..{} with cloud limit {}",
                params.start(),
                params.end(),
                params.cloud_limit
            );
            return Err(AnalysisError::NoImagery {
                cloud_limit: params.cloud_limit,
            });
        }

        let composite = collection.median().divide(REFLECTANCE_SCALE).clip(&roi);

        Ok(Scene {
            params: params.clone(),
            image_count,
            composite,
        })
    }

    /// True-colour tile layer of the composite
    pub async fn rgb_layer(&self, scene: &Scene) -> Result<TileLayer> {
        let layer = self
            .backend
            .tile_layer(
                scene.composite.to_expression(),
                &VisParams::rgb(),
                "Sentinel-2 RGB",
                RGB_ATTRIBUTION,
            )
            .await?;
        Ok(layer)
    }

    /// NDVI layer and statistics for one drawn region
    pub async fn analyze_region(&self, scene: &Scene, geometry: &Geometry) -> Result<RegionReport> {
        geometry.validate()?;
        let bounds = geometry.bounds().ok_or(GeometryError::Empty)?;
        let threshold = scene.params.ndvi_threshold;

        let region = EeGeometry::from_geojson(geometry);
        let ndvi = scene
            .composite
            .clone()
            .clip(&region)
            .normalized_difference(NIR_BAND, RED_BAND)
            .rename(NDVI_BAND);
        let vegetation_mask = ndvi.gte(threshold);
        let ndvi_masked = ndvi.update_mask(&vegetation_mask);

        let ndvi_layer = self
            .backend
            .tile_layer(
                ndvi_masked.to_expression(),
                &VisParams::ndvi(threshold),
                "NDVI",
                NDVI_ATTRIBUTION,
            )
            .await
            .map_err(AnalysisError::Region)?;

        let area_m2 = self.compute(region.area().to_expression()).await?.as_f64();

        let total = self
            .compute(
                ndvi.reduce_region(Reducer::count(), &region, REDUCTION_SCALE_M, MAX_PIXELS)
                    .to_expression(),
            )
            .await?;
        let total_pixels = band_value(&total, NDVI_BAND, 1.0);

        let vegetated = self
            .compute(
                vegetation_mask
                    .reduce_region(Reducer::sum(), &region, REDUCTION_SCALE_M, MAX_PIXELS)
                    .to_expression(),
            )
            .await?;
        let vegetation_pixels = band_value(&vegetated, NDVI_BAND, 0.0);

        let summary = self
            .compute(
                ndvi_masked
                    .reduce_region(
                        Reducer::min_max().combine(Reducer::mean(), true),
                        &region,
                        REDUCTION_SCALE_M,
                        MAX_PIXELS,
                    )
                    .to_expression(),
            )
            .await?;

        let vegetation_percentage = vegetation_percentage(vegetation_pixels, total_pixels);
        tracing::info!(
            "{} analysed: {:.2}% vegetation ({} of {} pixels)",
            geometry.kind(),
            vegetation_percentage,
            vegetation_pixels,
            total_pixels
        );

        Ok(RegionReport {
            ndvi_layer,
            bounds: bounds.to_lat_lng_bounds(),
            center: bounds.center(),
            area_m2,
            total_pixels,
            vegetation_pixels,
            vegetation_percentage,
            stats: NdviStats::from_reduction(&summary),
            threshold,
        })
    }

    /// Analyse the last shape a session has drawn
    ///
    /// Returns [`RegionOutcome::NotDrawn`] without contacting the service when
    /// there is nothing to analyse.
    pub async fn analyze_drawn(
        &self,
        params: &AnalysisParams,
        drawings: &DrawingSession,
    ) -> Result<RegionOutcome> {
        let geometry = match drawings.active_geometry() {
            None => return Ok(RegionOutcome::NotDrawn),
            Some(geometry) => geometry?,
        };

        let scene = self.scene(params).await?;
        let report = self.analyze_region(&scene, &geometry).await?;

        Ok(RegionOutcome::Analysed {
            image_count: scene.image_count,
            report: Box::new(report),
        })
    }

    async fn compute(&self, expression: vegscope_earthengine::Expression) -> Result<Value> {
        self.backend
            .compute(expression)
            .await
            .map_err(AnalysisError::Region)
    }
}
