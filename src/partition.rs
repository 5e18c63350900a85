use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::records::{DataError, FeatureRow, FieldNames, Record};

/// Validated records together with their distinct, ascending date keys.
#[derive(Debug, Clone)]
pub struct Partition {
    records: Vec<Record>,
    keys: Vec<NaiveDate>,
}

impl Partition {
    /// Validates every row before partitioning; the first bad row fails the
    /// whole partition.
    pub fn from_rows(rows: &[FeatureRow], fields: &FieldNames) -> Result<Self, DataError> {
        let records = rows
            .iter()
            .map(|row| Record::try_from((row, fields)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        let keys = date_keys(&records);
        Self { records, keys }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn keys(&self) -> &[NaiveDate] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Sorted, duplicate-free dates present in `records`.
pub fn date_keys(records: &[Record]) -> Vec<NaiveDate> {
    records
        .iter()
        .map(|r| r.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Records dated exactly `date`.
pub fn select(records: &[Record], date: NaiveDate) -> Vec<&Record> {
    records.iter().filter(|r| r.date == date).collect()
}
