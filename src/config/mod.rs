use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::backend::IdwParams;
use crate::records::FieldNames;

pub mod error;
pub use error::ConfigError;

pub mod policy;
pub use policy::{FailurePolicy, NamingScheme};

const DEFAULT_DATE_FIELD: &str = "Date";
const DEFAULT_VALUE_FIELD: &str = "Value";
const DEFAULT_POWER: f64 = 3.0;
const DEFAULT_SEARCH_POINTS: usize = 12;
const DEFAULT_PREFIX: &str = "IDW";

#[derive(Debug, Clone)]
pub struct Config {
    input_source: String,
    date_field: String,
    value_field: String,
    power: f64,
    search_points: usize,
    boundary: String,
    output_name_prefix: String,
    output_location: PathBuf,
    cell_size: Option<f64>,
    epsg: Option<u32>,
    naming: NamingScheme,
    on_error: FailurePolicy,
}

// Deserializes a Config through a helper struct so defaults are filled in and
// the numeric parameters and the output prefix are validated once.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            input_source: String,
            date_field: Option<String>,
            value_field: Option<String>,
            power: Option<f64>,
            search_points: Option<usize>,
            boundary: String,
            output_name_prefix: Option<String>,
            output_location: PathBuf,
            cell_size: Option<f64>,
            epsg: Option<u32>,
            #[serde(default)]
            naming: NamingScheme,
            #[serde(default)]
            on_error: FailurePolicy,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        let config = Config {
            input_source: helper.input_source,
            date_field: helper
                .date_field
                .unwrap_or_else(|| DEFAULT_DATE_FIELD.to_string()),
            value_field: helper
                .value_field
                .unwrap_or_else(|| DEFAULT_VALUE_FIELD.to_string()),
            power: helper.power.unwrap_or(DEFAULT_POWER),
            search_points: helper.search_points.unwrap_or(DEFAULT_SEARCH_POINTS),
            boundary: helper.boundary,
            output_name_prefix: helper
                .output_name_prefix
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            output_location: helper.output_location,
            cell_size: helper.cell_size,
            epsg: helper.epsg,
            naming: helper.naming,
            on_error: helper.on_error,
        };

        config.validate().map_err(D::Error::custom)?;

        Ok(config)
    }
}

impl Config {
    #[cfg(test)]
    pub fn new<P: Into<PathBuf>>(input_source: &str, boundary: &str, output_location: P) -> Self {
        Self {
            input_source: input_source.to_string(),
            date_field: DEFAULT_DATE_FIELD.to_string(),
            value_field: DEFAULT_VALUE_FIELD.to_string(),
            power: DEFAULT_POWER,
            search_points: DEFAULT_SEARCH_POINTS,
            boundary: boundary.to_string(),
            output_name_prefix: DEFAULT_PREFIX.to_string(),
            output_location: output_location.into(),
            cell_size: None,
            epsg: None,
            naming: NamingScheme::default(),
            on_error: FailurePolicy::default(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader)?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.input_source.trim().is_empty() {
            return Err(ConfigError::Invalid("input_source is empty".to_string()));
        }
        if self.boundary.trim().is_empty() {
            return Err(ConfigError::Invalid("boundary is empty".to_string()));
        }
        if !self.power.is_finite() || self.power <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "power must be a positive number, got {}",
                self.power
            )));
        }
        if let Some(cell_size) = self.cell_size
            && (!cell_size.is_finite() || cell_size <= 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "cell_size must be a positive number, got {}",
                cell_size
            )));
        }
        if self.output_name_prefix.is_empty()
            || self.output_name_prefix.contains(['/', '\\'])
        {
            return Err(ConfigError::Invalid(format!(
                "output_name_prefix `{}` must be a non-empty file name",
                self.output_name_prefix
            )));
        }
        Ok(())
    }

    pub fn with_on_error(mut self, on_error: FailurePolicy) -> Self {
        self.on_error = on_error;
        self
    }

    #[cfg(test)]
    pub fn with_naming(mut self, naming: NamingScheme) -> Self {
        self.naming = naming;
        self
    }

    #[cfg(test)]
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = Some(cell_size);
        self
    }

    pub fn input_source(&self) -> &str {
        &self.input_source
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn fields(&self) -> FieldNames {
        FieldNames::new(self.date_field.as_str(), self.value_field.as_str())
    }

    pub fn idw_params(&self) -> IdwParams {
        IdwParams {
            power: self.power,
            search_points: self.search_points,
        }
    }

    pub fn output_name_prefix(&self) -> &str {
        &self.output_name_prefix
    }

    pub fn output_location(&self) -> &Path {
        &self.output_location
    }

    pub fn cell_size(&self) -> Option<f64> {
        self.cell_size
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    pub fn naming(&self) -> NamingScheme {
        self.naming
    }

    pub fn on_error(&self) -> FailurePolicy {
        self.on_error
    }
}
