use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

// Accepted textual date layouts, tried in order. `%d-%m-%y` comes first so a
// two-digit day is never read as a year.
const DATE_FORMATS: [&str; 3] = ["%d-%m-%y", "%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// A point in the coordinate reference system of the input dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }
}

/// One validated precipitation sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub value: f64,
    pub location: Location,
}

impl Record {
    pub fn new(date: NaiveDate, value: f64, location: Location) -> Self {
        Self {
            date,
            value,
            location,
        }
    }
}

/// Date attribute of a raw feature, as found in the source layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DateCell {
    Date(NaiveDate),
    Missing,
    Unreadable(String),
}

impl DateCell {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return DateCell::Missing;
        }

        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return DateCell::Date(date);
            }
        }

        for format in DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
                return DateCell::Date(datetime.date());
            }
        }

        DateCell::Unreadable(text.to_string())
    }
}

/// A feature as read by a backend, before any field validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub fid: u64,
    pub date: DateCell,
    pub value: Option<f64>,
    pub location: Option<Location>,
}

/// Names of the attribute fields holding the date and the measured value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub date: String,
    pub value: String,
}

impl FieldNames {
    pub fn new(date: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("feature {fid}: field `{field}` is missing")]
    MissingField { fid: u64, field: String },
    #[error("feature {fid}: field `{field}` has unreadable value `{value}`")]
    UnreadableField {
        fid: u64,
        field: String,
        value: String,
    },
    #[error("feature {fid} has no point geometry")]
    MissingGeometry { fid: u64 },
    #[error("no records dated {date}")]
    EmptySubset { date: NaiveDate },
}

impl TryFrom<(&FeatureRow, &FieldNames)> for Record {
    type Error = DataError;

    fn try_from((row, fields): (&FeatureRow, &FieldNames)) -> Result<Self, Self::Error> {
        let date = match &row.date {
            DateCell::Date(date) => *date,
            DateCell::Missing => {
                return Err(DataError::MissingField {
                    fid: row.fid,
                    field: fields.date.clone(),
                });
            }
            DateCell::Unreadable(value) => {
                return Err(DataError::UnreadableField {
                    fid: row.fid,
                    field: fields.date.clone(),
                    value: value.clone(),
                });
            }
        };

        let value = match row.value {
            Some(value) if value.is_finite() => value,
            Some(value) => {
                return Err(DataError::UnreadableField {
                    fid: row.fid,
                    field: fields.value.clone(),
                    value: value.to_string(),
                });
            }
            None => {
                return Err(DataError::MissingField {
                    fid: row.fid,
                    field: fields.value.clone(),
                });
            }
        };

        let location = row
            .location
            .filter(|l| l.x.is_finite() && l.y.is_finite())
            .ok_or(DataError::MissingGeometry { fid: row.fid })?;

        Ok(Record::new(date, value, location))
    }
}
