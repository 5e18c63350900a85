use crate::extent::Extent;

// Largest grid a run will allocate, in cells.
pub const MAX_GRID_CELLS: usize = 100_000_000;

/// Processing settings shared by every per-date job of a run.
///
/// Built once from the boundary extent before the loop starts and passed
/// explicitly to the backend, so nothing leaks between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingEnvironment {
    extent: Extent,
    cell_size: f64,
    epsg: Option<u32>,
}

impl ProcessingEnvironment {
    pub fn new(extent: Extent, cell_size: Option<f64>, epsg: Option<u32>) -> Result<Self, String> {
        let cell_size = cell_size.unwrap_or_else(|| extent.default_cell_size());

        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(format!(
                "Cell size must be positive, got {} for extent {:?}",
                cell_size, extent
            ));
        }

        let env = Self {
            extent,
            cell_size,
            epsg,
        };
        let (cols, rows) = env.grid_size();
        match cols.checked_mul(rows) {
            Some(cells) if cells <= MAX_GRID_CELLS => Ok(env),
            _ => Err(format!(
                "Grid of {}x{} cells at cell size {} exceeds the {} cell limit",
                cols, rows, cell_size, MAX_GRID_CELLS
            )),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Number of columns and rows needed to cover the extent.
    pub fn grid_size(&self) -> (usize, usize) {
        let cols = (self.extent.width() / self.cell_size).ceil().max(1.0) as usize;
        let rows = (self.extent.height() / self.cell_size).ceil().max(1.0) as usize;
        (cols, rows)
    }

    /// North-up geotransform anchored at the top-left corner of the extent.
    pub fn geo_transform(&self) -> [f64; 6] {
        [
            self.extent.xmin,
            self.cell_size,
            0.0,
            self.extent.ymax,
            0.0,
            -self.cell_size,
        ]
    }
}
