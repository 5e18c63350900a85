//! Command line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::FailurePolicy;
use crate::stations::DEFAULT_EXPORT_PATH;

// NAD83 / UTM zone 17N, the projection of the built-in station coordinates.
const DEFAULT_STATION_EPSG: u32 = 26917;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Precipitation surfaces from dated station readings
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interpolate one clipped IDW raster per date in the input layer
    Interpolate {
        /// JSON configuration file
        #[arg(short, long)]
        config: PathBuf,
        /// Override the failure policy from the configuration
        #[arg(long, value_enum)]
        on_error: Option<FailurePolicy>,
    },
    /// Weather-station readings
    Stations {
        #[command(subcommand)]
        command: StationCommands,
    },
}

#[derive(Subcommand)]
pub enum StationCommands {
    /// List the known stations and their coordinates
    List,
    /// Validate a JSON sheet of readings and export it as a point shapefile
    Export {
        /// JSON array of entry forms
        #[arg(short, long)]
        entries: PathBuf,
        /// Output shapefile
        #[arg(short, long, default_value = DEFAULT_EXPORT_PATH)]
        output: PathBuf,
        /// EPSG code of the coordinates
        #[arg(long, default_value_t = DEFAULT_STATION_EPSG)]
        epsg: u32,
    },
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
