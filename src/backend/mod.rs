use std::path::Path;

use thiserror::Error;

use crate::boundary::Boundary;
use crate::environment::ProcessingEnvironment;
use crate::extent::Extent;
use crate::raster::RasterSurface;
use crate::records::{DataError, FeatureRow, FieldNames, Record};

pub mod gdal;
#[cfg(test)]
pub mod memory;

pub use self::gdal::GdalBackend;

/// IDW interpolation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdwParams {
    pub power: f64,
    /// Nearest samples used per cell; `0` uses every sample.
    pub search_points: usize,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("interpolation failed: {0}")]
    Interpolation(String),
    #[error("clip failed: {0}")]
    Clip(String),
    #[error("invalid boundary: {0}")]
    Boundary(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("GDAL error: {0}")]
    Gdal(#[from] ::gdal::errors::GdalError),
}

/// Geospatial primitives the batch driver depends on.
pub trait GeoBackend {
    fn read_records(&self, source: &str, fields: &FieldNames)
    -> Result<Vec<FeatureRow>, BackendError>;

    fn read_boundary(&self, source: &str) -> Result<Boundary, BackendError>;

    fn describe_extent(&self, boundary: &Boundary) -> Result<Extent, BackendError>;

    fn interpolate_idw(
        &self,
        points: &[&Record],
        params: &IdwParams,
        env: &ProcessingEnvironment,
    ) -> Result<RasterSurface, BackendError>;

    fn clip_raster(
        &self,
        surface: RasterSurface,
        boundary: &Boundary,
    ) -> Result<RasterSurface, BackendError>;

    /// Writes `surface` to `path`, replacing any existing file.
    fn write_raster(
        &self,
        surface: &RasterSurface,
        path: &Path,
        env: &ProcessingEnvironment,
    ) -> Result<(), BackendError>;
}
