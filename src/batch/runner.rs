use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::guard::{SubsetGuard, is_scratch_entry};
use super::naming::ArtifactNaming;
use super::report::{Artifact, BatchReport, JobFailure, Stage};
use crate::backend::{BackendError, GeoBackend, IdwParams};
use crate::boundary::Boundary;
use crate::config::{Config, FailurePolicy};
use crate::environment::ProcessingEnvironment;
use crate::partition::Partition;
use crate::records::DataError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Invalid processing environment: {0}")]
    Environment(String),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("batch aborted after {} raster(s): {failure}", .completed.len())]
    Aborted {
        failure: Box<JobFailure>,
        completed: Vec<Artifact>,
    },
}

/// Runs one interpolation job per distinct date in the input layer.
pub struct BatchRunner<'b> {
    backend: &'b dyn GeoBackend,
    config: Config,
}

struct JobContext<'c> {
    boundary: &'c Boundary,
    env: &'c ProcessingEnvironment,
    naming: &'c ArtifactNaming,
    params: IdwParams,
    output_dir: &'c Path,
}

// Scratch directories survive only if a previous run was killed mid-job.
// Assumes a single run per output location: the scratch of a concurrent run
// writing to the same directory is removed as well.
fn remove_stale_scratch(output_dir: &Path) -> Result<(), BackendError> {
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() && is_scratch_entry(&entry.file_name().to_string_lossy()) {
            debug!("Removing stale scratch directory {}", entry.path().display());
            fs::remove_dir_all(entry.path())?;
        }
    }
    Ok(())
}

impl<'b> BatchRunner<'b> {
    pub fn new(backend: &'b dyn GeoBackend, config: Config) -> Self {
        BatchRunner { backend, config }
    }

    pub fn process(&self) -> Result<BatchReport, RunError> {
        info!("Start Time: {}", Local::now().format("%a %b %e %H:%M:%S %Y"));

        let fields = self.config.fields();
        let rows = self
            .backend
            .read_records(self.config.input_source(), &fields)?;
        let partition = Partition::from_rows(&rows, &fields)?;
        if partition.is_empty() {
            warn!("Input layer {} has no records", self.config.input_source());
        }
        info!(
            "Dates retrieved: {} record(s) over {} date(s)",
            partition.records().len(),
            partition.keys().len()
        );

        let boundary = self.backend.read_boundary(self.config.boundary())?;
        let extent = self.backend.describe_extent(&boundary)?;
        let env = ProcessingEnvironment::new(extent, self.config.cell_size(), self.config.epsg())
            .map_err(RunError::Environment)?;
        let (cols, rows) = env.grid_size();
        info!(
            "Processing extent set to boundary: {}x{} cells of {}",
            cols,
            rows,
            env.cell_size()
        );

        let output_dir = self.config.output_location();
        fs::create_dir_all(output_dir).map_err(BackendError::from)?;
        remove_stale_scratch(output_dir)?;

        let naming = ArtifactNaming::new(self.config.output_name_prefix(), self.config.naming());
        for (name, dates) in naming.collisions(partition.keys()) {
            warn!(
                "Dates {:?} share the raster name {}; later dates overwrite earlier ones",
                dates, name
            );
        }

        let context = JobContext {
            boundary: &boundary,
            env: &env,
            naming: &naming,
            params: self.config.idw_params(),
            output_dir,
        };

        let mut report = BatchReport {
            date_count: partition.keys().len(),
            ..Default::default()
        };

        for &date in partition.keys() {
            info!("Processing date: {}", date);
            match self.run_job(&partition, date, &context) {
                Ok(artifact) => {
                    info!(
                        "✓ Saved raster for {} to: {}",
                        date,
                        artifact.path.display()
                    );
                    report.artifacts.push(artifact);
                }
                Err(failure) => {
                    error!(date = %failure.date, stage = %failure.stage, "✗ {}", failure);
                    match self.config.on_error() {
                        FailurePolicy::Abort => {
                            return Err(RunError::Aborted {
                                failure: Box::new(failure),
                                completed: report.artifacts,
                            });
                        }
                        FailurePolicy::Continue => report.failures.push(failure),
                    }
                }
            }
        }

        info!("End Time: {}", Local::now().format("%a %b %e %H:%M:%S %Y"));
        Ok(report)
    }

    fn run_job(
        &self,
        partition: &Partition,
        date: NaiveDate,
        context: &JobContext<'_>,
    ) -> Result<Artifact, JobFailure> {
        let guard = SubsetGuard::acquire(partition.records(), date, context.output_dir)
            .map_err(|e| JobFailure::new(date, Stage::Select, e))?;

        let surface = self
            .backend
            .interpolate_idw(guard.subset(), &context.params, context.env)
            .map_err(|e| JobFailure::new(date, Stage::Interpolate, e))?;
        debug!("IDW interpolation completed for {}", date);

        let clipped = self
            .backend
            .clip_raster(surface, context.boundary)
            .map_err(|e| JobFailure::new(date, Stage::Clip, e))?;
        debug!("Output clipped to boundary for {}:\n{}", date, clipped);

        let file_name = context.naming.file_name(date);
        let staged = guard.scratch_path().join(&file_name);
        let target = context.output_dir.join(&file_name);

        self.backend
            .write_raster(&clipped, &staged, context.env)
            .map_err(|e| JobFailure::new(date, Stage::Persist, e))?;
        fs::rename(&staged, &target).map_err(|e| JobFailure::new(date, Stage::Persist, e))?;

        Ok(Artifact {
            date,
            name: context.naming.name(date),
            path: target,
            valid_cells: clipped.valid_count(),
        })
    }
}
