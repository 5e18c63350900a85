use serde::Deserialize;
use std::fmt;

/// What the batch does when a single date fails.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FailurePolicy {
    /// Stop at the first failing date.
    #[default]
    #[serde(rename(deserialize = "abort"))]
    Abort,
    /// Report the failure and carry on with the next date.
    #[serde(rename(deserialize = "continue"))]
    Continue,
}

/// How artifact names encode the date.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingScheme {
    /// `MMDD`; dates from different years share a name.
    #[default]
    #[serde(rename(deserialize = "month_day"))]
    MonthDay,
    /// `YYYYMMDD`.
    #[serde(rename(deserialize = "year_month_day"))]
    YearMonthDay,
}

impl NamingScheme {
    pub fn date_format(&self) -> &'static str {
        match self {
            NamingScheme::MonthDay => "%m%d",
            NamingScheme::YearMonthDay => "%Y%m%d",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Continue => write!(f, "continue"),
        }
    }
}
