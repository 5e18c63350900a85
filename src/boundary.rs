use gdal::errors::GdalError;
use gdal::vector::{Geometry, OGRwkbGeometryType};
use gdal::version::VersionInfo;

use crate::extent::Extent;

/// Clip polygons shared read-only by every per-date job.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    polygons: Vec<Geometry>,
}

impl Boundary {
    /// Accepts `POLYGON` and `MULTIPOLYGON` geometries with a non-zero area.
    pub fn new(polygons: Vec<Geometry>) -> Result<Self, String> {
        if polygons.is_empty() {
            return Err("Boundary must contain at least one polygon".to_string());
        }

        // OGR containment tests always answer false without GEOS.
        if !VersionInfo::has_geos() {
            return Err("GDAL was built without GEOS, polygon masks are unavailable".to_string());
        }

        for polygon in &polygons {
            let name = polygon.geometry_name();
            if !name.eq_ignore_ascii_case("POLYGON") && !name.eq_ignore_ascii_case("MULTIPOLYGON") {
                return Err(format!("expected polygon geometry, found {}", name));
            }

            let envelope = polygon.envelope();
            if [envelope.MinX, envelope.MaxX, envelope.MinY, envelope.MaxY]
                .iter()
                .any(|v| !v.is_finite())
            {
                return Err("Boundary coordinates must be finite".to_string());
            }

            if polygon.is_empty() || polygon.area() <= 0.0 {
                return Err(format!("Boundary polygon has no area: {:?}", polygon));
            }
        }

        Ok(Self { polygons })
    }

    /// Bounding extent of all polygons.
    pub fn bounds(&self) -> Extent {
        let mut extent = Extent {
            xmin: f64::INFINITY,
            xmax: f64::NEG_INFINITY,
            ymin: f64::INFINITY,
            ymax: f64::NEG_INFINITY,
        };

        for envelope in self.polygons.iter().map(Geometry::envelope) {
            extent.xmin = extent.xmin.min(envelope.MinX);
            extent.xmax = extent.xmax.max(envelope.MaxX);
            extent.ymin = extent.ymin.min(envelope.MinY);
            extent.ymax = extent.ymax.max(envelope.MaxY);
        }

        extent
    }

    /// Reusable point for [`Boundary::contains`] lookups.
    pub fn probe_point() -> Result<Geometry, GdalError> {
        let mut point = Geometry::empty(OGRwkbGeometryType::wkbPoint)?;
        point.set_point_2d(0, (0.0, 0.0));
        Ok(point)
    }

    /// Strict containment: points on an edge are outside.
    pub fn contains(&self, point: &Geometry) -> bool {
        self.polygons.iter().any(|polygon| polygon.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary(wkt: &[&str]) -> Result<Boundary, String> {
        Boundary::new(wkt.iter().map(|w| Geometry::from_wkt(w).unwrap()).collect())
    }

    fn point(x: f64, y: f64) -> Geometry {
        let mut point = Boundary::probe_point().unwrap();
        point.set_point_2d(0, (x, y));
        point
    }

    #[test]
    fn test_contains_with_hole() {
        let boundary =
            boundary(&["POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0), (4 4, 6 4, 6 6, 4 6, 4 4))"])
                .unwrap();

        assert!(boundary.contains(&point(1.0, 1.0)));
        assert!(!boundary.contains(&point(5.0, 5.0)));
        assert!(!boundary.contains(&point(11.0, 5.0)));
        // On the exterior edge.
        assert!(!boundary.contains(&point(10.0, 5.0)));
    }

    #[test]
    fn test_multipolygon_bounds() {
        let boundary = boundary(&[
            "POLYGON ((0 0, 2 0, 2 2, 0 2, 0 0))",
            "MULTIPOLYGON (((10 5, 13 5, 13 8, 10 8, 10 5)))",
        ])
        .unwrap();

        assert_eq!(
            boundary.bounds(),
            Extent::new(0.0, 13.0, 0.0, 8.0).unwrap()
        );
        assert!(boundary.contains(&point(11.0, 6.0)));
        assert!(!boundary.contains(&point(5.0, 1.0)));
    }

    #[test]
    fn test_triangle_contains() {
        let boundary = boundary(&["POLYGON ((0 0, 10 0, 0 10, 0 0))"]).unwrap();

        assert!(boundary.contains(&point(2.0, 2.0)));
        assert!(!boundary.contains(&point(8.0, 8.0)));
    }

    #[test]
    fn test_rejects_degenerate_boundaries() {
        assert!(Boundary::new(vec![]).is_err());
        assert!(boundary(&["POLYGON ((0 0, 1 1, 0 0, 0 0))"]).is_err());
        assert!(boundary(&["POLYGON EMPTY"]).is_err());
        assert!(boundary(&["LINESTRING (0 0, 1 1)"]).is_err());
        assert!(boundary(&["POINT (1 1)"]).is_err());
    }
}
