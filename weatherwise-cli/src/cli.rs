use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use inquire::{Password, PasswordDisplayMode, Text};
use std::sync::Arc;
use tracing::warn;
use weatherwise_core::{
    Config, ForecastLoader, ForecastState, SelectedPlace, WeatherData, WeatherSource,
    dashboard::{Metric, ViewOptions},
    provider::provider_from_config,
};

use crate::{
    render::{self, Zone},
    search,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherwise", version, about = "WeatherWise forecast dashboard")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ZoneArgs {
    /// IANA time zone for clock values, e.g. "Europe/Zurich". Defaults to local time.
    #[arg(long, value_name = "ZONE")]
    tz: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MetricArg {
    Temperature,
    Humidity,
    WindSpeed,
}

impl From<MetricArg> for Metric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Temperature => Metric::Temperature,
            MetricArg::Humidity => Metric::Humidity,
            MetricArg::WindSpeed => Metric::WindSpeed,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and the default place.
    Configure,

    /// Current conditions and the hourly strip for a place.
    Show {
        /// Place name; defaults to the configured place.
        place: Option<String>,

        #[command(flatten)]
        zone: ZoneArgs,
    },

    /// Multi-day forecast with a trend chart.
    Forecast {
        /// Place name; defaults to the configured place.
        place: Option<String>,

        /// Number of days to show.
        #[arg(long, conflicts_with = "all")]
        days: Option<usize>,

        /// Show every day in the response.
        #[arg(long)]
        all: bool,

        /// Metric plotted in the trend chart.
        #[arg(long, value_enum, default_value_t = MetricArg::Temperature)]
        metric: MetricArg,

        #[command(flatten)]
        zone: ZoneArgs,
    },

    /// Search a place interactively with suggestions, then show it.
    Search {
        #[command(flatten)]
        zone: ZoneArgs,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => {
                let mut config = config_for_configure(Config::load());
                configure(&mut config)?;
            }
            Command::Show { place, zone } => {
                let config = Config::load()?;
                let zone = Zone::parse(zone.tz.as_deref())?;
                let place = place.unwrap_or_else(|| config.default_place.clone());
                let data = load_forecast(&config, &place).await?;
                print!("{}", render::home_page(&data, zone, &ViewOptions::from(&config)));
            }
            Command::Forecast {
                place,
                days,
                all,
                metric,
                zone,
            } => {
                let mut config = Config::load()?;
                let zone = Zone::parse(zone.tz.as_deref())?;
                if let Some(days) = days {
                    config.forecast.max_days = days;
                    config.forecast.all_days = false;
                }
                if all {
                    config.forecast.all_days = true;
                }
                config.validate()?;

                let place = place.unwrap_or_else(|| config.default_place.clone());
                let data = load_forecast(&config, &place).await?;
                print!(
                    "{}",
                    render::forecast_page(&data, zone, &ViewOptions::from(&config), metric.into())
                );
            }
            Command::Search { zone } => {
                let config = Config::load()?;
                let zone = Zone::parse(zone.tz.as_deref())?;
                let place = search::pick_place(&config).await?;
                let data = load_forecast(&config, &place).await?;
                print!("{}", render::home_page(&data, zone, &ViewOptions::from(&config)));
            }
        }

        Ok(())
    }
}

/// `configure` rewrites the file, so a broken one falls back to defaults.
fn config_for_configure(loaded: Result<Config>) -> Config {
    loaded.unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable config, starting from defaults");
        Config::default()
    })
}

fn configure(config: &mut Config) -> Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    config.set_api_key(api_key);

    let place = Text::new("Default place:")
        .with_default(&config.default_place)
        .prompt()?;
    if !place.trim().is_empty() {
        config.default_place = place.trim().to_string();
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Fetch the forecast for `place` through the loader and wait for the outcome.
async fn load_forecast(config: &Config, place: &str) -> Result<Arc<WeatherData>> {
    let source: Arc<dyn WeatherSource> = Arc::new(provider_from_config(config)?);
    let (writer, reader) = SelectedPlace::new(place);
    let mut loader = ForecastLoader::spawn(source, reader, config.forecast.sample_count);

    let outcome = loader.settled().await;
    drop(writer);

    match outcome {
        ForecastState::Ready(data) => Ok(data),
        ForecastState::Failed(message) => Err(anyhow!("An error occurred: {message}")),
        ForecastState::Loading => Err(anyhow!("Forecast is still loading")),
    }
}
