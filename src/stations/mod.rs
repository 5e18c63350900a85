//! Manual weather-station readings and their export to a point layer.

use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::backend::BackendError;
use crate::records::Location;

pub mod entry;
pub mod registry;

pub use entry::{EntryForm, EntrySheet};
pub use registry::StationRegistry;

pub const DEFAULT_EXPORT_PATH: &str = "weather_stations.shp";

/// One validated reading, ready for export.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReading {
    pub station: String,
    pub date: NaiveDate,
    pub precipitation: f64,
    pub location: Location,
}

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("Station already exists: {0}")]
    DuplicateStation(String),
    #[error("Please fill in all fields.")]
    MissingFields,
    #[error("Date must be in DD-MM-YY format, got `{0}`")]
    InvalidDate(String),
    #[error("Coordinates must be two numbers separated by a comma, got `{0}`")]
    InvalidCoordinates(String),
    #[error("Precipitation must be a number, got `{0}`")]
    InvalidPrecipitation(String),
    #[error("No data to save.")]
    NoData,
    #[error("Failed to export readings: {0}")]
    Export(#[from] BackendError),
}

/// Destination for validated readings.
pub trait PointSink {
    fn write_points(
        &self,
        readings: &[StationReading],
        path: &Path,
        epsg: u32,
    ) -> Result<(), BackendError>;
}
