use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use super::{BackendError, GeoBackend, IdwParams};
use crate::boundary::Boundary;
use crate::environment::ProcessingEnvironment;
use crate::extent::Extent;
use crate::grid;
use crate::raster::RasterSurface;
use crate::records::{FeatureRow, FieldNames, Record};

/// Deterministic in-memory backend that records how it was called.
///
/// Interpolation yields a constant surface holding the subset mean, so
/// outputs only depend on the input rows.
#[derive(Debug)]
pub struct MemoryBackend {
    rows: Vec<FeatureRow>,
    boundary: Boundary,
    pub extent_calls: Cell<usize>,
    pub boundary_reads: Cell<usize>,
    pub interpolate_calls: Cell<usize>,
    pub fail_clip_on_call: Option<usize>,
    pub fail_write: bool,
    clip_calls: Cell<usize>,
    pub written: RefCell<Vec<PathBuf>>,
}

impl MemoryBackend {
    pub fn new(rows: Vec<FeatureRow>, boundary: Boundary) -> Self {
        Self {
            rows,
            boundary,
            extent_calls: Cell::new(0),
            boundary_reads: Cell::new(0),
            interpolate_calls: Cell::new(0),
            fail_clip_on_call: None,
            fail_write: false,
            clip_calls: Cell::new(0),
            written: RefCell::new(Vec::new()),
        }
    }
}

impl GeoBackend for MemoryBackend {
    fn read_records(
        &self,
        _source: &str,
        _fields: &FieldNames,
    ) -> Result<Vec<FeatureRow>, BackendError> {
        Ok(self.rows.clone())
    }

    fn read_boundary(&self, _source: &str) -> Result<Boundary, BackendError> {
        self.boundary_reads.set(self.boundary_reads.get() + 1);
        Ok(self.boundary.clone())
    }

    fn describe_extent(&self, boundary: &Boundary) -> Result<Extent, BackendError> {
        self.extent_calls.set(self.extent_calls.get() + 1);
        Ok(boundary.bounds())
    }

    fn interpolate_idw(
        &self,
        points: &[&Record],
        _params: &IdwParams,
        env: &ProcessingEnvironment,
    ) -> Result<RasterSurface, BackendError> {
        self.interpolate_calls.set(self.interpolate_calls.get() + 1);

        if grid::idw::distinct_locations(points) < 2 {
            return Err(BackendError::Interpolation(format!(
                "{} point(s), at least 2 distinct locations required",
                points.len()
            )));
        }

        let mean = points.iter().map(|r| r.value).sum::<f64>() / points.len() as f64;
        let (cols, rows) = env.grid_size();
        RasterSurface::new(cols, rows, env.geo_transform(), vec![mean as f32; cols * rows])
            .map_err(BackendError::Interpolation)
    }

    fn clip_raster(
        &self,
        surface: RasterSurface,
        boundary: &Boundary,
    ) -> Result<RasterSurface, BackendError> {
        let call = self.clip_calls.get() + 1;
        self.clip_calls.set(call);

        if self.fail_clip_on_call == Some(call) {
            return Err(BackendError::Clip(
                "clipped raster has no valid cells".to_string(),
            ));
        }

        grid::clip_to_boundary(surface, boundary)
    }

    fn write_raster(
        &self,
        surface: &RasterSurface,
        path: &Path,
        _env: &ProcessingEnvironment,
    ) -> Result<(), BackendError> {
        if self.fail_write {
            // Leave a partial file behind like an interrupted driver would.
            std::fs::write(path, b"partial")?;
            return Err(BackendError::Io(std::io::Error::other("disk full")));
        }

        std::fs::write(path, surface.to_string())?;
        self.written.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}
