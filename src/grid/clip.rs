use crate::backend::BackendError;
use crate::boundary::Boundary;
use crate::raster::RasterSurface;

/// Crops `surface` to the boundary extent and masks cells whose center lies
/// outside the boundary polygon.
///
/// An output with no valid cell is an error: an empty artifact is never
/// written.
pub fn clip_to_boundary(
    surface: RasterSurface,
    boundary: &Boundary,
) -> Result<RasterSurface, BackendError> {
    let gt = surface.geo_transform();
    if gt[2] != 0.0 || gt[4] != 0.0 || gt[1] <= 0.0 || gt[5] >= 0.0 {
        return Err(BackendError::Clip(
            "only north-up rasters can be clipped".to_string(),
        ));
    }

    let bounds = boundary.bounds();
    let col_start = ((bounds.xmin - gt[0]) / gt[1]).floor().max(0.0) as usize;
    let col_end = (((bounds.xmax - gt[0]) / gt[1]).ceil().max(0.0) as usize).min(surface.width());
    let row_start = ((bounds.ymax - gt[3]) / gt[5]).floor().max(0.0) as usize;
    let row_end = (((bounds.ymin - gt[3]) / gt[5]).ceil().max(0.0) as usize).min(surface.height());

    if col_start >= col_end || row_start >= row_end {
        return Err(BackendError::Clip(
            "raster does not overlap the boundary".to_string(),
        ));
    }

    let width = col_end - col_start;
    let height = row_end - row_start;
    let no_data = surface.no_data();
    let mut data = Vec::with_capacity(width * height);
    let mut center = Boundary::probe_point()?;

    for row in row_start..row_end {
        for col in col_start..col_end {
            center.set_point_2d(0, surface.cell_center(col, row));
            let value = match surface.get(col, row) {
                Some(v) if surface.is_valid(v) && boundary.contains(&center) => v,
                _ => no_data,
            };
            data.push(value);
        }
    }

    let clipped_gt = [
        gt[0] + col_start as f64 * gt[1],
        gt[1],
        0.0,
        gt[3] + row_start as f64 * gt[5],
        0.0,
        gt[5],
    ];

    let clipped =
        RasterSurface::new(width, height, clipped_gt, data).map_err(BackendError::Clip)?;

    if clipped.valid_count() == 0 {
        return Err(BackendError::Clip(
            "clipped raster has no valid cells".to_string(),
        ));
    }

    Ok(clipped)
}
