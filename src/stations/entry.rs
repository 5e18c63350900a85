use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use tracing::info;

use super::{EntryError, PointSink, StationReading, StationRegistry};
use crate::records::Location;

const ENTRY_DATE_FORMAT: &str = "%d-%m-%y";

/// Raw form values, as typed by the operator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryForm {
    #[serde(default)]
    pub station: String,
    #[serde(default)]
    pub new_station: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub precipitation: String,
    /// `"x, y"`; left blank to use the registry coordinates of the station.
    #[serde(default)]
    pub coordinates: String,
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(f64),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
    })
}

fn parse_coordinates(text: &str) -> Result<Location, EntryError> {
    let invalid = || EntryError::InvalidCoordinates(text.to_string());

    let parts: Vec<&str> = text.split(',').collect();
    let [x, y] = parts.as_slice() else {
        return Err(invalid());
    };
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(invalid());
    }

    Ok(Location::new(x, y))
}

/// Readings collected during one entry session.
#[derive(Debug, Default)]
pub struct EntrySheet {
    registry: StationRegistry,
    readings: Vec<StationReading>,
}

impl EntrySheet {
    pub fn readings(&self) -> &[StationReading] {
        &self.readings
    }

    /// Validates `form` and appends it to the sheet.
    ///
    /// A new station is registered before the remaining checks run and stays
    /// registered even if they fail.
    pub fn add_entry(&mut self, form: &EntryForm) -> Result<&StationReading, EntryError> {
        let mut station = form.station.trim().to_string();
        let new_station = form.new_station.trim();
        if !new_station.is_empty() {
            self.registry.register(new_station)?;
            info!("New station added: {}", new_station);
            station = new_station.to_string();
        }

        let date = form.date.trim();
        let precipitation = form.precipitation.trim();
        let coordinates = form.coordinates.trim();
        let stored = self.registry.coordinates(&station);

        if station.is_empty()
            || date.is_empty()
            || precipitation.is_empty()
            || (coordinates.is_empty() && stored.is_none())
        {
            return Err(EntryError::MissingFields);
        }

        let date = NaiveDate::parse_from_str(date, ENTRY_DATE_FORMAT)
            .map_err(|_| EntryError::InvalidDate(date.to_string()))?;

        let location = match stored {
            Some(location) if coordinates.is_empty() => location,
            _ => parse_coordinates(coordinates)?,
        };

        let precipitation = precipitation
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| EntryError::InvalidPrecipitation(precipitation.to_string()))?;

        self.readings.push(StationReading {
            station,
            date,
            precipitation,
            location,
        });

        Ok(&self.readings[self.readings.len() - 1])
    }

    /// Writes every reading through `sink`; returns how many were written.
    pub fn save(&self, sink: &dyn PointSink, path: &Path, epsg: u32) -> Result<usize, EntryError> {
        if self.readings.is_empty() {
            return Err(EntryError::NoData);
        }

        sink.write_points(&self.readings, path, epsg)?;
        info!(
            "Data successfully saved to {} ({} reading(s))",
            path.display(),
            self.readings.len()
        );

        Ok(self.readings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingSink {
        written: RefCell<Vec<(PathBuf, u32, Vec<StationReading>)>>,
    }

    impl PointSink for RecordingSink {
        fn write_points(
            &self,
            readings: &[StationReading],
            path: &Path,
            epsg: u32,
        ) -> Result<(), BackendError> {
            self.written
                .borrow_mut()
                .push((path.to_path_buf(), epsg, readings.to_vec()));
            Ok(())
        }
    }

    fn form(station: &str, date: &str, precipitation: &str, coordinates: &str) -> EntryForm {
        EntryForm {
            station: station.to_string(),
            new_station: String::new(),
            date: date.to_string(),
            precipitation: precipitation.to_string(),
            coordinates: coordinates.to_string(),
        }
    }

    #[test]
    fn test_add_entry_with_registry_coordinates() {
        let mut sheet = EntrySheet::default();

        let reading = sheet
            .add_entry(&form("Trent Lakes", "01-05-24", "12.4", ""))
            .unwrap()
            .clone();

        assert_eq!(reading.station, "Trent Lakes");
        assert_eq!(reading.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(reading.precipitation, 12.4);
        assert_eq!(
            reading.location,
            Location::new(698755.170782, 4939899.274223)
        );
    }

    #[test]
    fn test_typed_coordinates_override_registry() {
        let mut sheet = EntrySheet::default();

        let reading = sheet
            .add_entry(&form("Trent Lakes", "01-05-24", "3", "700000.5, 4940000"))
            .unwrap();

        assert_eq!(reading.location, Location::new(700000.5, 4940000.0));
    }

    #[test]
    fn test_new_station_requires_coordinates() {
        let mut sheet = EntrySheet::default();
        let mut entry = form("", "15-06-24", "4.2", "");
        entry.new_station = "Lindsay".to_string();

        let err = sheet.add_entry(&entry).unwrap_err();
        assert!(matches!(err, EntryError::MissingFields));
        // Registration sticks even though the entry was rejected.
        assert!(sheet.registry.contains("Lindsay"));

        entry.new_station = String::new();
        entry.station = "Lindsay".to_string();
        entry.coordinates = "680000, 4915000".to_string();
        let reading = sheet.add_entry(&entry).unwrap();
        assert_eq!(reading.station, "Lindsay");
    }

    #[test]
    fn test_duplicate_new_station_is_rejected() {
        let mut sheet = EntrySheet::default();
        let mut entry = form("", "15-06-24", "4.2", "1, 2");
        entry.new_station = "Pigeon River".to_string();

        assert!(matches!(
            sheet.add_entry(&entry),
            Err(EntryError::DuplicateStation(_))
        ));
        assert!(sheet.readings().is_empty());
    }

    #[test]
    fn test_validation_errors() {
        let mut sheet = EntrySheet::default();

        assert!(matches!(
            sheet.add_entry(&form("Trent Lakes", "", "1", "")),
            Err(EntryError::MissingFields)
        ));
        assert!(matches!(
            sheet.add_entry(&form("Trent Lakes", "2024-05-01", "1", "")),
            Err(EntryError::InvalidDate(_))
        ));
        assert!(matches!(
            sheet.add_entry(&form("Trent Lakes", "31-02-24", "1", "")),
            Err(EntryError::InvalidDate(_))
        ));
        assert!(matches!(
            sheet.add_entry(&form("Trent Lakes", "01-05-24", "1", "700000")),
            Err(EntryError::InvalidCoordinates(_))
        ));
        assert!(matches!(
            sheet.add_entry(&form("Trent Lakes", "01-05-24", "1", "a, b")),
            Err(EntryError::InvalidCoordinates(_))
        ));
        assert!(matches!(
            sheet.add_entry(&form("Trent Lakes", "01-05-24", "heavy", "")),
            Err(EntryError::InvalidPrecipitation(_))
        ));
        assert!(sheet.readings().is_empty());
    }

    #[test]
    fn test_form_accepts_numeric_precipitation() {
        let entry: EntryForm = serde_json::from_str(
            r#"{"station": "Ken Reid CA", "date": "01-05-24", "precipitation": 7.5}"#,
        )
        .unwrap();

        assert_eq!(entry.precipitation, "7.5");
        assert!(entry.coordinates.is_empty());
    }

    #[test]
    fn test_save() {
        let sink = RecordingSink::default();
        let mut sheet = EntrySheet::default();
        let path = Path::new("weather_stations.shp");

        assert!(matches!(
            sheet.save(&sink, path, 26917),
            Err(EntryError::NoData)
        ));
        assert!(sink.written.borrow().is_empty());

        sheet
            .add_entry(&form("Ken Reid CA", "01-05-24", "5", ""))
            .unwrap();
        sheet
            .add_entry(&form("Mariposa Brook", "01-05-24", "7", ""))
            .unwrap();

        assert_eq!(sheet.save(&sink, path, 26917).unwrap(), 2);
        let written = sink.written.borrow();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, PathBuf::from("weather_stations.shp"));
        assert_eq!(written[0].1, 26917);
        assert_eq!(written[0].2.len(), 2);
    }
}
