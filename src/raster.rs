use std::fmt;

pub const DEFAULT_NO_DATA: f32 = -9999.0;

/// Row-major single-band grid with a north-up geotransform.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSurface {
    width: usize,
    height: usize,
    geo_transform: [f64; 6],
    no_data: f32,
    data: Vec<f32>,
}

impl RasterSurface {
    pub fn new(
        width: usize,
        height: usize,
        geo_transform: [f64; 6],
        data: Vec<f32>,
    ) -> Result<Self, String> {
        if data.len() != width * height {
            return Err(format!(
                "Buffer holds {} cells, expected {}x{}",
                data.len(),
                width,
                height
            ));
        }

        Ok(Self {
            width,
            height,
            geo_transform,
            no_data: DEFAULT_NO_DATA,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn geo_transform(&self) -> [f64; 6] {
        self.geo_transform
    }

    pub fn no_data(&self) -> f32 {
        self.no_data
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.data[row * self.width + col])
    }

    pub fn is_valid(&self, value: f32) -> bool {
        !value.is_nan() && value != self.no_data
    }

    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&v| self.is_valid(v)).count()
    }

    /// Map coordinates of the center of a cell.
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        let gt = &self.geo_transform;
        let c = col as f64 + 0.5;
        let r = row as f64 + 0.5;
        (gt[0] + c * gt[1] + r * gt[2], gt[3] + c * gt[4] + r * gt[5])
    }

    fn valid_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied().filter(|&v| self.is_valid(v))
    }
}

impl fmt::Display for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min_value = self.valid_values().fold(f32::NAN, f32::min);
        let max_value = self.valid_values().fold(f32::NAN, f32::max);

        write!(
            f,
            "Width: {}\nHeight: {}\nValid cells: {} / {}\nMin value: {}\nMax value: {}",
            self.width,
            self.height,
            self.valid_count(),
            self.data.len(),
            min_value,
            max_value,
        )
    }
}
