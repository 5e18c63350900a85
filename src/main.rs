mod backend;
mod batch;
mod boundary;
mod cli;
mod config;
mod environment;
mod extent;
mod grid;
mod partition;
mod raster;
mod records;
mod stations;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};

use backend::GdalBackend;
use batch::BatchRunner;
use cli::{Cli, Commands, StationCommands};
use config::{Config, FailurePolicy};
use stations::{EntryForm, EntrySheet, StationRegistry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_level())
        .with_target(cli.verbose >= 2)
        .init();

    debug!("pluvio started with verbosity level: {}", cli.verbose);

    match cli.command {
        Commands::Interpolate { config, on_error } => interpolate(&config, on_error),
        Commands::Stations { command } => match command {
            StationCommands::List => {
                list_stations();
                Ok(())
            }
            StationCommands::Export {
                entries,
                output,
                epsg,
            } => export_stations(&entries, &output, epsg),
        },
    }
}

fn interpolate(config_path: &Path, on_error: Option<FailurePolicy>) -> Result<()> {
    let mut config = Config::from_file(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    if let Some(policy) = on_error {
        config = config.with_on_error(policy);
    }
    info!("Failure policy: {}", config.on_error());

    let backend = GdalBackend::new();
    let processor = BatchRunner::new(&backend, config);
    let report = processor.process()?;

    println!("{}", report);
    if !report.is_complete() {
        bail!("{} date(s) failed", report.failures.len());
    }

    Ok(())
}

fn list_stations() {
    for (name, location) in StationRegistry::default().iter() {
        match location {
            Some(l) => println!("{:<30} {:>15.6} {:>15.6}", name, l.x, l.y),
            None => println!("{:<30} {:>15} {:>15}", name, "-", "-"),
        }
    }
}

fn export_stations(entries: &Path, output: &Path, epsg: u32) -> Result<()> {
    let reader = BufReader::new(
        File::open(entries).with_context(|| format!("Failed to open {}", entries.display()))?,
    );
    let forms: Vec<EntryForm> = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {}", entries.display()))?;

    let mut sheet = EntrySheet::default();
    let mut rejected = 0;
    for (index, form) in forms.iter().enumerate() {
        match sheet.add_entry(form) {
            Ok(reading) => debug!("Entry {} accepted: {:?}", index + 1, reading),
            Err(e) => {
                rejected += 1;
                eprintln!("Entry {} rejected: {}", index + 1, e);
            }
        }
    }

    info!(
        "{} of {} entries accepted",
        sheet.readings().len(),
        forms.len()
    );

    let written = sheet.save(&GdalBackend::new(), output, epsg)?;
    println!("{} reading(s) written to {}", written, output.display());

    if rejected > 0 {
        bail!("{} of {} entries rejected", rejected, forms.len());
    }

    Ok(())
}
