//! Core library for the `weatherwise` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the forecast and place-lookup traits
//! - Forecast normalization (daily buckets, chart series) and unit helpers
//! - The debounced suggestion fetcher and the shared selected-place store
//! - Presentation view-models for the dashboard sections
//!
//! It is used by `weatherwise-cli`, but can also back other front ends.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod loader;
pub mod model;
pub mod place;
pub mod provider;
pub mod suggest;
pub mod units;

pub use config::Config;
pub use error::WeatherError;
pub use loader::{ForecastLoader, ForecastState};
pub use model::{ChartPoint, CityInfo, DailyBucket, ForecastSample, WeatherData};
pub use place::{PlaceReader, PlaceWriter, SelectedPlace};
pub use provider::{PlaceLookup, WeatherSource, openweather::OpenWeatherProvider};
pub use suggest::{SearchPhase, SearchSettings, SearchState, SuggestionFetcher};
