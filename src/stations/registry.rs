use crate::records::Location;

use super::EntryError;

// Built-in stations, NAD83 / UTM zone 17N.
const BUILTIN_STATIONS: [(&str, f64, f64); 8] = [
    ("Indian Point Provincial Park", 671762.467765, 4942091.670869),
    ("Trent Lakes", 698755.170782, 4939899.274223),
    ("Ken Reid CA", 677995.773456, 4919108.288842),
    ("Emily Provincial Park", 696573.633603, 4912811.396583),
    ("Mariposa Brook", 672204.305075, 4906307.845103),
    ("Port Perry Weather Station", 663228.542903, 4886175.508981),
    ("Blackstock Creek", 673675.877741, 4888815.840527),
    ("Pigeon River", 684408.215127, 4888258.639894),
];

/// Known weather stations in registration order. Stations added at run time
/// have no stored coordinates.
#[derive(Debug, Clone)]
pub struct StationRegistry {
    stations: Vec<(String, Option<Location>)>,
}

impl Default for StationRegistry {
    fn default() -> Self {
        Self {
            stations: BUILTIN_STATIONS
                .iter()
                .map(|&(name, x, y)| (name.to_string(), Some(Location::new(x, y))))
                .collect(),
        }
    }
}

impl StationRegistry {
    pub fn contains(&self, name: &str) -> bool {
        self.stations.iter().any(|(n, _)| n == name)
    }

    pub fn coordinates(&self, name: &str) -> Option<Location> {
        self.stations
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, location)| *location)
    }

    pub fn register(&mut self, name: &str) -> Result<(), EntryError> {
        if self.contains(name) {
            return Err(EntryError::DuplicateStation(name.to_string()));
        }
        self.stations.push((name.to_string(), None));
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<Location>)> {
        self.stations.iter().map(|(n, l)| (n.as_str(), *l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = StationRegistry::default();

        assert_eq!(registry.iter().count(), 8);
        assert_eq!(
            registry.coordinates("Ken Reid CA"),
            Some(Location::new(677995.773456, 4919108.288842))
        );
        assert_eq!(registry.iter().next().unwrap().0, "Indian Point Provincial Park");
        assert!(registry.coordinates("Lindsay").is_none());
    }

    #[test]
    fn test_register_new_station() {
        let mut registry = StationRegistry::default();

        registry.register("Lindsay").unwrap();

        assert!(registry.contains("Lindsay"));
        assert_eq!(registry.coordinates("Lindsay"), None);
        assert_eq!(registry.iter().last().unwrap().0, "Lindsay");
        assert!(matches!(
            registry.register("Trent Lakes"),
            Err(EntryError::DuplicateStation(_))
        ));
    }
}
