use crate::backend::{BackendError, IdwParams};
use crate::environment::ProcessingEnvironment;
use crate::raster::RasterSurface;
use crate::records::{Location, Record};

// Distance below which a cell is considered to sit on a sample.
const COINCIDENT_DISTANCE: f64 = 1e-9;

/// Number of distinct sample locations in `points`.
pub fn distinct_locations(points: &[&Record]) -> usize {
    let mut seen: Vec<Location> = Vec::with_capacity(points.len());
    for record in points {
        if !seen.contains(&record.location) {
            seen.push(record.location);
        }
    }
    seen.len()
}

/// Inverse-distance-weighted surface over the environment grid.
///
/// Each cell takes the weighted mean of its `search_points` nearest samples
/// with weights `1 / d^power`. A cell sitting on samples takes their mean.
pub fn interpolate(
    points: &[&Record],
    params: &IdwParams,
    env: &ProcessingEnvironment,
) -> Result<RasterSurface, BackendError> {
    let distinct = distinct_locations(points);
    if distinct < 2 {
        return Err(BackendError::Interpolation(format!(
            "{} sample(s) at {} distinct location(s), at least 2 distinct locations required",
            points.len(),
            distinct
        )));
    }

    if !params.power.is_finite() || params.power <= 0.0 {
        return Err(BackendError::Interpolation(format!(
            "power must be positive, got {}",
            params.power
        )));
    }

    let (cols, rows) = env.grid_size();
    let gt = env.geo_transform();
    let neighbours = match params.search_points {
        0 => points.len(),
        n => n.min(points.len()),
    };

    let mut distances: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    let mut data = Vec::with_capacity(cols * rows);

    for row in 0..rows {
        let y = gt[3] + (row as f64 + 0.5) * gt[5];
        for col in 0..cols {
            let x = gt[0] + (col as f64 + 0.5) * gt[1];

            distances.clear();
            distances.extend(
                points
                    .iter()
                    .map(|r| (r.location.distance_squared(x, y).sqrt(), r.value)),
            );

            data.push(weighted_mean(&mut distances, neighbours, params.power) as f32);
        }
    }

    RasterSurface::new(cols, rows, gt, data).map_err(BackendError::Interpolation)
}

fn weighted_mean(distances: &mut [(f64, f64)], neighbours: usize, power: f64) -> f64 {
    let (exact_sum, exact_count) = distances
        .iter()
        .filter(|(d, _)| *d < COINCIDENT_DISTANCE)
        .fold((0.0, 0usize), |(sum, n), (_, v)| (sum + v, n + 1));
    if exact_count > 0 {
        return exact_sum / exact_count as f64;
    }

    if neighbours < distances.len() {
        distances.select_nth_unstable_by(neighbours - 1, |a, b| a.0.total_cmp(&b.0));
    }

    // Distances are scaled by the nearest one so the largest weight is 1 and
    // high powers cannot underflow every weight to zero.
    let selected = &distances[..neighbours];
    let nearest = selected
        .iter()
        .map(|(d, _)| *d)
        .fold(f64::INFINITY, f64::min);

    let (weighted, total_weight) = selected
        .iter()
        .fold((0.0, 0.0), |(weighted, total), (d, v)| {
            let w = (d / nearest).powf(-power);
            (weighted + w * v, total + w)
        });

    weighted / total_weight
}
