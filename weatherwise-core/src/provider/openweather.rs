use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::{
    config::ForecastConfig,
    error::WeatherError,
    model::{CityInfo, ForecastSample, WeatherData},
};

use super::{PlaceLookup, WeatherSource};

const FORECAST_PATH: &str = "/data/2.5/forecast";
const FIND_PATH: &str = "/data/2.5/find";

/// Visibility reported when a sample omits it.
const DEFAULT_VISIBILITY_M: u32 = 10_000;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, config: &ForecastConfig) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| WeatherError::Transport {
                endpoint: "OpenWeather".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| WeatherError::Transport {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| WeatherError::Transport {
            endpoint: endpoint.to_string(),
            message: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "OpenWeather request rejected");
            return Err(WeatherError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: u32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    icon: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: Option<String>,
    coord: OwCoord,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwFindEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwFindResponse {
    #[serde(default)]
    list: Vec<OwFindEntry>,
}

impl From<OwForecastEntry> for ForecastSample {
    fn from(entry: OwForecastEntry) -> Self {
        let (icon, description) = entry
            .weather
            .into_iter()
            .next()
            .map(|w| (w.icon, w.description))
            .unwrap_or_default();

        Self {
            timestamp: entry.dt,
            temperature_k: entry.main.temp,
            feels_like_k: entry.main.feels_like,
            temp_min_k: entry.main.temp_min,
            temp_max_k: entry.main.temp_max,
            humidity_pct: entry.main.humidity,
            pressure_hpa: entry.main.pressure,
            visibility_m: entry.visibility.unwrap_or(DEFAULT_VISIBILITY_M),
            wind_speed_mps: entry.wind.speed,
            icon,
            description,
        }
    }
}

impl From<OwCity> for CityInfo {
    fn from(city: OwCity) -> Self {
        Self {
            name: city.name,
            country: city.country,
            latitude: city.coord.lat,
            longitude: city.coord.lon,
            sunrise: city.sunrise,
            sunset: city.sunset,
        }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn fetch_forecast(
        &self,
        place: &str,
        sample_count: u32,
    ) -> Result<WeatherData, WeatherError> {
        let count = sample_count.to_string();
        let parsed: OwForecastResponse = self
            .get_json(
                "OpenWeather forecast",
                FORECAST_PATH,
                &[("q", place), ("cnt", count.as_str())],
            )
            .await?;

        debug!(samples = parsed.list.len(), city = %parsed.city.name, "Forecast received");

        Ok(WeatherData {
            city: parsed.city.into(),
            list: parsed.list.into_iter().map(ForecastSample::from).collect(),
        })
    }
}

#[async_trait]
impl PlaceLookup for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn lookup(&self, query: &str) -> Result<Vec<String>, WeatherError> {
        let parsed: OwFindResponse = self
            .get_json("OpenWeather find", FIND_PATH, &[("q", query)])
            .await?;

        debug!(matches = parsed.list.len(), "Place lookup answered");

        Ok(parsed.list.into_iter().map(|entry| entry.name).collect())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
