use std::path::Path;

use chrono::NaiveDate;
use tempfile::TempDir;
use tracing::debug;

use crate::backend::BackendError;
use crate::partition;
use crate::records::{DataError, Record};

// Scratch directories are hidden siblings of the artifacts so the final
// rename stays on one filesystem.
const SCRATCH_PREFIX: &str = ".pluvio-";

/// Per-date transient resources: the selected subset and a scratch directory.
///
/// Both are released when the guard goes out of scope, whichever way the job
/// for that date ends.
#[derive(Debug)]
pub struct SubsetGuard<'a> {
    date: NaiveDate,
    subset: Vec<&'a Record>,
    scratch: TempDir,
}

impl<'a> SubsetGuard<'a> {
    pub fn acquire(
        records: &'a [Record],
        date: NaiveDate,
        scratch_root: &Path,
    ) -> Result<Self, BackendError> {
        let subset = partition::select(records, date);
        if subset.is_empty() {
            return Err(DataError::EmptySubset { date }.into());
        }

        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(scratch_root)?;

        debug!(
            "Feature layer for {} created with {} point(s)",
            date,
            subset.len()
        );

        Ok(Self {
            date,
            subset,
            scratch,
        })
    }

    pub fn subset(&self) -> &[&'a Record] {
        &self.subset
    }

    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }
}

impl Drop for SubsetGuard<'_> {
    fn drop(&mut self) {
        // TempDir removes the scratch directory once this returns.
        debug!("Temporary layer for {} released", self.date);
    }
}

pub fn is_scratch_entry(name: &str) -> bool {
    name.starts_with(SCRATCH_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Location;
    use tempfile::tempdir;

    fn records() -> Vec<Record> {
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        vec![
            Record::new(day(1), 1.0, Location::new(0.0, 0.0)),
            Record::new(day(1), 2.0, Location::new(1.0, 0.0)),
            Record::new(day(2), 3.0, Location::new(2.0, 0.0)),
        ]
    }

    #[test]
    fn test_scratch_released_on_drop() {
        let root = tempdir().unwrap();
        let records = records();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let scratch = {
            let guard = SubsetGuard::acquire(&records, date, root.path()).unwrap();
            assert_eq!(guard.subset().len(), 2);
            assert!(guard.scratch_path().is_dir());
            std::fs::write(guard.scratch_path().join("staged.tif"), b"x").unwrap();
            guard.scratch_path().to_path_buf()
        };

        assert!(!scratch.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_scratch_released_on_early_return() {
        fn failing_job(records: &[Record], root: &Path) -> Result<(), BackendError> {
            let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
            let guard = SubsetGuard::acquire(records, date, root)?;
            std::fs::write(guard.scratch_path().join("partial.tif"), b"x")?;
            Err(BackendError::Interpolation("too few points".to_string()))
        }

        let root = tempdir().unwrap();
        assert!(failing_job(&records(), root.path()).is_err());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_subset_is_rejected() {
        let root = tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

        let err = SubsetGuard::acquire(&records(), date, root.path()).unwrap_err();

        assert!(matches!(
            err,
            BackendError::Data(DataError::EmptySubset { .. })
        ));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_scratch_names_are_recognised() {
        assert!(is_scratch_entry(".pluvio-a1b2"));
        assert!(!is_scratch_entry("IDW0501.tif"));
    }
}
