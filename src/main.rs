//! metcast - daily day/night forecast summaries from MET Norway
//!
//! Fetches the Locationforecast for one point (or reads it from the hourly
//! cache), aggregates it per day and prints a text report, JSON or the raw
//! payload.

use std::io::{self, Write};

use clap::Parser;

use metcast::cache::DiskCache;
use metcast::cli::{Cli, DaySelector, OutputFormat, RunOptions};
use metcast::config::ForecastConfig;
use metcast::forecast::{DayAggregate, ForecastError, ForecastSession};
use metcast::report::Report;
use metcast::symbol::{FileIcons, MetnoIcons, SymbolRenderer};
use metcast::transport::HttpTransport;

/// Installs the stderr log subscriber; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Looks up the requested days in the session
fn select_days(
    session: &mut ForecastSession,
    selector: DaySelector,
) -> Result<Vec<&DayAggregate>, ForecastError> {
    match selector {
        DaySelector::Date(date) => Ok(vec![session.for_date(date)?]),
        DaySelector::First(count) => Ok(session.first_n_days(count)?.iter().collect()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let options = RunOptions::from_cli(&cli)?;
    init_logging(options.verbose);

    let mut config = match &options.config_path {
        Some(path) => ForecastConfig::from_file(path)?,
        None => ForecastConfig::default(),
    };
    if let Some(dir) = &options.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    let selection = config.selection;
    let cache_dir = config.resolved_cache_dir();

    let transport = HttpTransport::new()?;
    let mut session = ForecastSession::new(options.location, config, Box::new(transport));
    if options.use_cache {
        match cache_dir {
            Some(dir) => session = session.with_cache(Box::new(DiskCache::with_dir(dir))),
            None => tracing::warn!("No cache directory available, caching disabled"),
        }
    }

    match options.output {
        OutputFormat::Raw => {
            session.load()?;
            if let Some(payload) = session.raw_payload() {
                let mut stdout = io::stdout().lock();
                stdout.write_all(payload)?;
                stdout.write_all(b"\n")?;
            }
        }
        OutputFormat::Json => {
            let days = select_days(&mut session, options.days)?;
            println!("{}", serde_json::to_string_pretty(&days)?);
        }
        OutputFormat::Text => {
            let renderer: Box<dyn SymbolRenderer> = match &options.icon_ext {
                Some(ext) => Box::new(FileIcons::new(ext.as_str())),
                None => Box::new(MetnoIcons),
            };
            let days = select_days(&mut session, options.days)?;
            let report = Report::new(renderer.as_ref(), &selection);
            print!("{}", report.render_days(days));
        }
    }

    Ok(())
}
