use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::NamingScheme;

pub const ARTIFACT_EXTENSION: &str = "tif";

/// Deterministic artifact names derived from a date key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNaming {
    prefix: String,
    scheme: NamingScheme,
}

impl ArtifactNaming {
    pub fn new(prefix: &str, scheme: NamingScheme) -> Self {
        Self {
            prefix: prefix.to_string(),
            scheme,
        }
    }

    pub fn name(&self, date: NaiveDate) -> String {
        format!("{}{}", self.prefix, date.format(self.scheme.date_format()))
    }

    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{}.{}", self.name(date), ARTIFACT_EXTENSION)
    }

    /// Names shared by more than one date, with the dates that map to them.
    pub fn collisions(&self, keys: &[NaiveDate]) -> Vec<(String, Vec<NaiveDate>)> {
        let mut by_name: BTreeMap<String, Vec<NaiveDate>> = BTreeMap::new();
        for &date in keys {
            by_name.entry(self.name(date)).or_default().push(date);
        }

        by_name
            .into_iter()
            .filter(|(_, dates)| dates.len() > 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_day_names() {
        let naming = ArtifactNaming::new("IDW", NamingScheme::MonthDay);

        assert_eq!(naming.name(date(2024, 5, 1)), "IDW0501");
        assert_eq!(naming.name(date(2024, 6, 15)), "IDW0615");
        assert_eq!(naming.file_name(date(2024, 12, 9)), "IDW1209.tif");
        assert_eq!(naming.name(date(2024, 5, 1)), naming.name(date(2024, 5, 1)));
    }

    #[test]
    fn test_year_month_day_names() {
        let naming = ArtifactNaming::new("PRECIP_", NamingScheme::YearMonthDay);

        assert_eq!(naming.name(date(2024, 5, 1)), "PRECIP_20240501");
    }

    #[test]
    fn test_collisions_across_years() {
        let keys = [date(2023, 5, 1), date(2024, 5, 1), date(2024, 6, 15)];

        let month_day = ArtifactNaming::new("IDW", NamingScheme::MonthDay);
        assert_eq!(
            month_day.collisions(&keys),
            vec![("IDW0501".to_string(), vec![date(2023, 5, 1), date(2024, 5, 1)])]
        );

        let full = ArtifactNaming::new("IDW", NamingScheme::YearMonthDay);
        assert!(full.collisions(&keys).is_empty());
    }
}
