use std::path::Path;

use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::{
    Feature, FieldValue, Geometry, LayerAccess, LayerOptions, OGRFieldType, OGRwkbGeometryType,
};
use gdal::{Dataset, DriverManager};
use tracing::debug;

use super::{BackendError, GeoBackend, IdwParams};
use crate::boundary::Boundary;
use crate::environment::ProcessingEnvironment;
use crate::extent::Extent;
use crate::grid;
use crate::raster::RasterSurface;
use crate::records::{DateCell, FeatureRow, FieldNames, Location, Record};
use crate::stations::{PointSink, StationReading};

// Shapefile sidecars replaced together with the `.shp` itself.
const SHAPEFILE_PARTS: [&str; 5] = ["shp", "shx", "dbf", "prj", "cpg"];

// Attribute table of the station export, in field order.
const STATION_FIELDS: [(&str, OGRFieldType::Type); 5] = [
    ("Station", OGRFieldType::OFTString),
    ("Date", OGRFieldType::OFTDate),
    ("Prec", OGRFieldType::OFTReal),
    ("X", OGRFieldType::OFTReal),
    ("Y", OGRFieldType::OFTReal),
];

/// Backend reading vectors through OGR and writing GeoTIFFs through GDAL.
#[derive(Debug, Default)]
pub struct GdalBackend;

impl GdalBackend {
    pub fn new() -> Self {
        Self
    }
}

fn date_cell(value: Option<FieldValue>) -> DateCell {
    match value {
        Some(FieldValue::DateValue(date)) => DateCell::Date(date),
        Some(FieldValue::DateTimeValue(datetime)) => DateCell::Date(datetime.date_naive()),
        Some(FieldValue::StringValue(text)) => DateCell::parse(&text),
        Some(other) => DateCell::Unreadable(format!("{:?}", other)),
        None => DateCell::Missing,
    }
}

fn numeric_value(value: Option<FieldValue>) -> Option<f64> {
    match value? {
        FieldValue::RealValue(v) => Some(v),
        FieldValue::IntegerValue(v) => Some(v as f64),
        FieldValue::Integer64Value(v) => Some(v as f64),
        FieldValue::StringValue(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn point_location(geometry: Option<&Geometry>) -> Option<Location> {
    let geometry = geometry?;
    if !geometry.geometry_name().eq_ignore_ascii_case("POINT") || geometry.point_count() == 0 {
        return None;
    }
    let (x, y, _) = geometry.get_point(0);
    Some(Location::new(x, y))
}

fn remove_shapefile(path: &Path) -> Result<(), BackendError> {
    for extension in SHAPEFILE_PARTS {
        let part = path.with_extension(extension);
        if part.exists() {
            std::fs::remove_file(&part)?;
        }
    }
    Ok(())
}

impl GeoBackend for GdalBackend {
    fn read_records(
        &self,
        source: &str,
        fields: &FieldNames,
    ) -> Result<Vec<FeatureRow>, BackendError> {
        let dataset = Dataset::open(source)?;
        let mut layer = dataset.layer(0)?;
        let mut rows = Vec::new();

        for (index, feature) in layer.features().enumerate() {
            let mut date = None;
            let mut value = None;
            for (name, field) in feature.fields() {
                if name.eq_ignore_ascii_case(&fields.date) {
                    date = field;
                } else if name.eq_ignore_ascii_case(&fields.value) {
                    value = field;
                }
            }

            rows.push(FeatureRow {
                fid: feature.fid().unwrap_or(index as u64),
                date: date_cell(date),
                value: numeric_value(value),
                location: point_location(feature.geometry()),
            });
        }

        debug!("Read {} feature(s) from {}", rows.len(), source);
        Ok(rows)
    }

    fn read_boundary(&self, source: &str) -> Result<Boundary, BackendError> {
        let dataset = Dataset::open(source)?;
        let mut layer = dataset.layer(0)?;
        let polygons: Vec<Geometry> = layer
            .features()
            .filter_map(|feature| feature.geometry().cloned())
            .collect();

        debug!("Read {} boundary polygon(s) from {}", polygons.len(), source);
        Boundary::new(polygons).map_err(BackendError::Boundary)
    }

    fn describe_extent(&self, boundary: &Boundary) -> Result<Extent, BackendError> {
        let bounds = boundary.bounds();
        Extent::new(bounds.xmin, bounds.xmax, bounds.ymin, bounds.ymax)
            .map_err(BackendError::Boundary)
    }

    fn interpolate_idw(
        &self,
        points: &[&Record],
        params: &IdwParams,
        env: &ProcessingEnvironment,
    ) -> Result<RasterSurface, BackendError> {
        grid::interpolate(points, params, env)
    }

    fn clip_raster(
        &self,
        surface: RasterSurface,
        boundary: &Boundary,
    ) -> Result<RasterSurface, BackendError> {
        grid::clip_to_boundary(surface, boundary)
    }

    fn write_raster(
        &self,
        surface: &RasterSurface,
        path: &Path,
        env: &ProcessingEnvironment,
    ) -> Result<(), BackendError> {
        let (width, height) = (surface.width(), surface.height());
        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut dataset = driver.create_with_band_type::<f32, _>(path, width, height, 1)?;

        dataset.set_geo_transform(&surface.geo_transform())?;
        if let Some(epsg) = env.epsg() {
            let srs = SpatialRef::from_epsg(epsg)?;
            dataset.set_spatial_ref(&srs)?;
        }

        let mut band = dataset.rasterband(1)?;
        band.set_no_data_value(Some(surface.no_data() as f64))?;
        let mut buffer = Buffer::new((width, height), surface.data().to_vec());
        band.write((0, 0), (width, height), &mut buffer)?;

        Ok(())
    }
}

impl PointSink for GdalBackend {
    fn write_points(
        &self,
        readings: &[StationReading],
        path: &Path,
        epsg: u32,
    ) -> Result<(), BackendError> {
        remove_shapefile(path)?;

        let driver = DriverManager::get_driver_by_name("ESRI Shapefile")?;
        let mut dataset = driver.create_vector_only(path)?;
        let srs = SpatialRef::from_epsg(epsg)?;
        let layer_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("stations");

        let layer = dataset.create_layer(LayerOptions {
            name: layer_name,
            srs: Some(&srs),
            ty: OGRwkbGeometryType::wkbPoint,
            options: None,
        })?;
        layer.create_defn_fields(&STATION_FIELDS)?;

        for reading in readings {
            let Location { x, y } = reading.location;
            let mut point = Geometry::empty(OGRwkbGeometryType::wkbPoint)?;
            point.set_point_2d(0, (x, y));

            let values = [
                FieldValue::StringValue(reading.station.clone()),
                FieldValue::DateValue(reading.date),
                FieldValue::RealValue(reading.precipitation),
                FieldValue::RealValue(x),
                FieldValue::RealValue(y),
            ];

            let mut feature = Feature::new(layer.defn())?;
            feature.set_geometry(point)?;
            for (index, value) in values.iter().enumerate() {
                feature.set_field(index, value)?;
            }
            feature.create(&layer)?;
        }

        debug!("Wrote {} point(s) to {}", readings.len(), path.display());
        Ok(())
    }
}
