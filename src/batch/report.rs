use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::backend::BackendError;

/// Step of a per-date job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Select,
    Interpolate,
    Clip,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Select => "select",
            Stage::Interpolate => "interpolate",
            Stage::Clip => "clip",
            Stage::Persist => "persist",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error)]
#[error("{stage} failed for {date}: {error}")]
pub struct JobFailure {
    pub date: NaiveDate,
    pub stage: Stage,
    #[source]
    pub error: BackendError,
}

impl JobFailure {
    pub fn new(date: NaiveDate, stage: Stage, error: impl Into<BackendError>) -> Self {
        Self {
            date,
            stage,
            error: error.into(),
        }
    }
}

/// A raster written for one date key.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub date: NaiveDate,
    pub name: String,
    pub path: PathBuf,
    pub valid_cells: usize,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub date_count: usize,
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<JobFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.artifacts.len() == self.date_count
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dates: {}, rasters written: {}, failures: {}",
            self.date_count,
            self.artifacts.len(),
            self.failures.len()
        )?;
        for artifact in &self.artifacts {
            write!(
                f,
                "\n  ✓ {} {} ({} valid cells)",
                artifact.date, artifact.name, artifact.valid_cells
            )?;
        }
        for failure in &self.failures {
            write!(f, "\n  ✗ {}", failure)?;
        }
        Ok(())
    }
}
