// Default analysis cell count along the shorter side of the extent.
const DEFAULT_CELLS_ON_SHORT_SIDE: f64 = 250.0;

/// Axis-aligned bounding extent in the coordinate system of the data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Extent {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self, String> {
        if ![xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite()) {
            return Err("Extent coordinates must be finite".to_string());
        }

        if xmin > xmax || ymin > ymax {
            return Err("Min values must be <= max values".to_string());
        }

        Ok(Extent {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Cell size used when none is configured: the shorter side split into 250 cells.
    pub fn default_cell_size(&self) -> f64 {
        self.width().min(self.height()) / DEFAULT_CELLS_ON_SHORT_SIDE
    }
}

#[cfg(test)]
mod test {
    use crate::extent::Extent;

    #[test]
    fn test_extent_validation() {
        let valid = Extent::new(660000.0, 700000.0, 4880000.0, 4945000.0);
        assert!(valid.is_ok());

        let invalid_order_x = Extent::new(10.0, 0.0, 0.0, 10.0);
        assert!(invalid_order_x.is_err());

        let invalid_order_y = Extent::new(0.0, 10.0, 10.0, 0.0);
        assert!(invalid_order_y.is_err());

        let not_finite = Extent::new(0.0, f64::INFINITY, 0.0, 10.0);
        assert!(not_finite.is_err());
    }

    #[test]
    fn test_default_cell_size_uses_shorter_side() {
        let extent = Extent::new(0.0, 1000.0, 0.0, 500.0).unwrap();

        assert_eq!(extent.width(), 1000.0);
        assert_eq!(extent.height(), 500.0);
        assert_eq!(extent.default_cell_size(), 2.0);
    }
}
