use std::path::PathBuf;

use anyhow::{Context, Result};
use bikeshare_dash::config::Config;
use bikeshare_dash::report::Report;
use bikeshare_dash::{DashboardState, DatasetStore, Season, Weather};
use clap::Parser;

/// Print the bike-sharing dashboard panels for the given sidebar selections.
#[derive(Debug, Parser)]
#[command(name = "bikeshare-report", version)]
struct Args {
    /// TOML configuration file.
    #[arg(long, env = "BIKESHARE_CONFIG")]
    config: Option<PathBuf>,

    /// Daily table (.csv, .json or .parquet); overrides the config.
    #[arg(long)]
    daily: Option<PathBuf>,

    /// Hourly table (.csv, .json or .parquet); overrides the config.
    #[arg(long)]
    hourly: Option<PathBuf>,

    /// Inclusive month range, e.g. `3-9`.
    #[arg(long, value_parser = parse_month_range)]
    months: Option<(u8, u8)>,

    /// Season codes to keep (1-4). Repeat the flag; omit for all seasons.
    #[arg(long = "season")]
    seasons: Vec<u8>,

    /// Weather codes to keep (1-4). Repeat the flag; omit for all conditions.
    #[arg(long = "weather")]
    weather: Vec<u8>,
}

fn parse_month_range(s: &str) -> Result<(u8, u8), String> {
    let (lo, hi) = s
        .split_once('-')
        .ok_or_else(|| format!("expected <lo>-<hi>, got '{s}'"))?;
    let lo = lo.trim().parse::<u8>().map_err(|e| e.to_string())?;
    let hi = hi.trim().parse::<u8>().map_err(|e| e.to_string())?;
    Ok((lo, hi))
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(daily) = args.daily {
        config.data.daily = daily;
    }
    if let Some(hourly) = args.hourly {
        config.data.hourly = hourly;
    }

    let store = DatasetStore::load_files(&config.data.daily, &config.data.hourly)
        .context("loading bike-sharing tables")?;
    let mut state = DashboardState::new(store).context("building initial view")?;

    if let Some((lo, hi)) = args.months {
        state.set_months(lo, hi).context("month range")?;
    }
    if !args.seasons.is_empty() {
        let seasons = args
            .seasons
            .iter()
            .map(|&c| Season::try_from(c))
            .collect::<Result<Vec<_>, _>>()
            .context("season selection")?;
        state
            .apply(state.filters().clone().seasons(seasons))
            .context("season selection")?;
    }
    if !args.weather.is_empty() {
        let weather = args
            .weather
            .iter()
            .map(|&c| Weather::try_from(c))
            .collect::<Result<Vec<_>, _>>()
            .context("weather selection")?;
        state
            .apply(state.filters().clone().weather(weather))
            .context("weather selection")?;
    }

    let store = state.store();
    let report = Report::build(
        &store.daily(),
        &store.hourly(),
        &state.visible(),
        &config.report,
    )?;
    print!("{report}");
    Ok(())
}

fn main() {
    let args = Args::parse();

    // Peek at the config only for the log level; errors surface again in `run`.
    let level = args
        .config
        .as_deref()
        .and_then(|p| Config::load(p).ok())
        .map(|c| c.log.level)
        .unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(args) {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
