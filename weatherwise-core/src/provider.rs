use crate::{Config, WeatherData, error::WeatherError, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of raw forecast data, one request per place change.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_forecast(
        &self,
        place: &str,
        sample_count: u32,
    ) -> Result<WeatherData, WeatherError>;
}

/// Free-text place lookup backing the search suggestions.
#[async_trait]
pub trait PlaceLookup: Send + Sync + Debug {
    /// Matching place names, in the order the service returned them.
    async fn lookup(&self, query: &str) -> Result<Vec<String>, WeatherError>;
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> Result<OpenWeatherProvider, WeatherError> {
    let api_key = config.api_key().ok_or(WeatherError::MissingApiKey)?;
    OpenWeatherProvider::new(api_key, &config.forecast)
}
