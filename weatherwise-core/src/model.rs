use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One 3-hour forecast data point, temperatures in Kelvin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Unix seconds.
    pub timestamp: i64,
    pub temperature_k: f64,
    pub feels_like_k: f64,
    pub temp_min_k: f64,
    pub temp_max_k: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub visibility_m: u32,
    pub wind_speed_mps: f64,
    /// OpenWeather icon code, e.g. "10d".
    pub icon: String,
    pub description: String,
}

/// Location metadata returned alongside the sample list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityInfo {
    pub name: String,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Unix seconds.
    pub sunrise: i64,
    /// Unix seconds.
    pub sunset: i64,
}

/// A decoded forecast response for one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub city: CityInfo,
    pub list: Vec<ForecastSample>,
}

/// Samples sharing a UTC calendar date, reduced to one daytime representative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyBucket<'a> {
    pub date: NaiveDate,
    pub representative: Option<&'a ForecastSample>,
}

/// One point of the chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// "dd MMM HH:mm" in the viewer time zone.
    pub label: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    /// km/h.
    pub wind_speed: f64,
}
