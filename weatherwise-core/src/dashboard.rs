//! Presentation-ready values for the dashboard sections.
//!
//! Every field is a display string. Missing samples fall back to the literal
//! defaults below instead of failing, so a half-empty response still renders.

use chrono::TimeZone;
use serde::Serialize;
use std::fmt::Display;

use crate::{
    config::Config,
    forecast::{self, current_sample},
    model::{ChartPoint, CityInfo, ForecastSample},
    units::{self, DayWindow, local_datetime},
};

pub const DEFAULT_TEMPERATURE_K: f64 = 296.37;
pub const DEFAULT_VISIBILITY_M: u32 = 10_000;
pub const DEFAULT_WIND_SPEED_MPS: f64 = 1.64;
pub const DEFAULT_SUNRISE: i64 = 1_702_949_452;
pub const DEFAULT_SUNSET: i64 = 1_702_517_657;
/// Sunrise and sunset shown on daily cards when no city is known.
pub const DEFAULT_DAILY_SUN_TIME: i64 = 1_702_517_657;
pub const DEFAULT_DAILY_ICON: &str = "01d";
const MISSING: &str = "-";

const WEEKDAY_FORMAT: &str = "%A";
const FULL_DATE_FORMAT: &str = "%d.%m.%Y";
const SHORT_DATE_FORMAT: &str = "%d.%m";
const HOUR_FORMAT: &str = "%-I:%M %p";
const CLOCK_FORMAT: &str = "%-H:%M";

/// Knobs the view-models read from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    pub max_days: Option<usize>,
    pub daytime_start_hour: u32,
    pub icons: DayWindow,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ViewOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_days: config.forecast.day_limit(),
            daytime_start_hour: config.forecast.daytime_start_hour,
            icons: config.icons,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub location: String,
    pub coordinates: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherDetails {
    pub visibility: String,
    pub pressure: String,
    pub humidity: String,
    pub wind_speed: String,
    pub sunrise: String,
    pub sunset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub weekday: String,
    pub date: String,
    pub temperature: String,
    pub feels_like: String,
    pub temp_min: String,
    pub temp_max: String,
    pub description: String,
    pub icon: String,
    pub details: WeatherDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyEntry {
    pub time: String,
    pub icon: String,
    pub temperature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyDetail {
    pub weekday: String,
    pub date: String,
    pub description: String,
    pub icon: String,
    pub temperature: String,
    pub feels_like: String,
    pub temp_min: String,
    pub temp_max: String,
    pub details: WeatherDetails,
}

/// Series selectable in the trend chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    Temperature,
    Humidity,
    WindSpeed,
}

impl Metric {
    pub fn value(self, point: &ChartPoint) -> f64 {
        match self {
            Metric::Temperature => point.temperature_c,
            Metric::Humidity => f64::from(point.humidity_pct),
            Metric::WindSpeed => point.wind_speed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
            Metric::WindSpeed => "Wind speed",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
            Metric::WindSpeed => "km/h",
        }
    }
}

fn degrees(kelvin: f64) -> String {
    format!("{}°", units::kelvin_to_celsius(kelvin))
}

fn format_at<Tz>(timestamp: i64, tz: &Tz, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    local_datetime(timestamp, tz)
        .map(|dt| dt.format(pattern).to_string())
        .unwrap_or_default()
}

fn details<Tz>(
    sample: Option<&ForecastSample>,
    sunrise: i64,
    sunset: i64,
    tz: &Tz,
) -> WeatherDetails
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    WeatherDetails {
        visibility: format!(
            "{} km",
            units::meters_to_kilometers(sample.map_or(DEFAULT_VISIBILITY_M, |s| s.visibility_m))
        ),
        pressure: sample.map_or_else(|| MISSING.to_string(), |s| format!("{} hPa", s.pressure_hpa)),
        humidity: sample.map_or_else(|| MISSING.to_string(), |s| format!("{}%", s.humidity_pct)),
        wind_speed: units::convert_wind_speed(
            sample.map_or(DEFAULT_WIND_SPEED_MPS, |s| s.wind_speed_mps),
        ),
        sunrise: format_at(sunrise, tz, CLOCK_FORMAT),
        sunset: format_at(sunset, tz, CLOCK_FORMAT),
    }
}

pub fn header(city: &CityInfo) -> Header {
    let location = match &city.country {
        Some(country) if !country.is_empty() => format!("{}, {}", city.name, country),
        _ => city.name.clone(),
    };
    Header {
        location,
        coordinates: format!(
            "Latitude: {}°, Longitude: {}°",
            city.latitude, city.longitude
        ),
    }
}

/// Summary built from the first sample of the response.
pub fn current_conditions<Tz>(
    samples: &[ForecastSample],
    city: Option<&CityInfo>,
    tz: &Tz,
    options: &ViewOptions,
) -> CurrentConditions
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let first = current_sample(samples);
    let when = |pattern: &str| first.map(|s| format_at(s.timestamp, tz, pattern)).unwrap_or_default();

    CurrentConditions {
        weekday: when(WEEKDAY_FORMAT),
        date: when(FULL_DATE_FORMAT),
        temperature: degrees(first.map_or(DEFAULT_TEMPERATURE_K, |s| s.temperature_k)),
        feels_like: degrees(first.map_or(0.0, |s| s.feels_like_k)),
        temp_min: degrees(first.map_or(0.0, |s| s.temp_min_k)),
        temp_max: degrees(first.map_or(0.0, |s| s.temp_max_k)),
        description: first.map(|s| s.description.clone()).unwrap_or_default(),
        icon: first
            .map(|s| units::day_or_night_icon(&s.icon, s.timestamp, tz, &options.icons))
            .unwrap_or_default(),
        details: details(
            first,
            city.map_or(DEFAULT_SUNRISE, |c| c.sunrise),
            city.map_or(DEFAULT_SUNSET, |c| c.sunset),
            tz,
        ),
    }
}

/// The horizontal strip of every sample in the response.
pub fn hourly_strip<Tz>(samples: &[ForecastSample], tz: &Tz, options: &ViewOptions) -> Vec<HourlyEntry>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    samples
        .iter()
        .map(|s| HourlyEntry {
            time: format_at(s.timestamp, tz, HOUR_FORMAT),
            icon: units::day_or_night_icon(&s.icon, s.timestamp, tz, &options.icons),
            temperature: degrees(s.temperature_k),
        })
        .collect()
}

/// One card per calendar date, built from that date's daytime representative.
pub fn daily_details<Tz>(
    samples: &[ForecastSample],
    city: Option<&CityInfo>,
    tz: &Tz,
    options: &ViewOptions,
) -> Vec<DailyDetail>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let sunrise = city.map_or(DEFAULT_DAILY_SUN_TIME, |c| c.sunrise);
    let sunset = city.map_or(DEFAULT_DAILY_SUN_TIME, |c| c.sunset);

    forecast::daily_buckets(samples, options.max_days, tz, options.daytime_start_hour)
        .into_iter()
        .map(|bucket| {
            let rep = bucket.representative;
            let when = |pattern: &str| rep.map(|s| format_at(s.timestamp, tz, pattern)).unwrap_or_default();

            DailyDetail {
                weekday: when(WEEKDAY_FORMAT),
                date: when(SHORT_DATE_FORMAT),
                description: rep.map(|s| s.description.clone()).unwrap_or_default(),
                icon: rep.map_or_else(|| DEFAULT_DAILY_ICON.to_string(), |s| s.icon.clone()),
                temperature: degrees(rep.map_or(0.0, |s| s.temperature_k)),
                feels_like: degrees(rep.map_or(0.0, |s| s.feels_like_k)),
                temp_min: degrees(rep.map_or(0.0, |s| s.temp_min_k)),
                temp_max: degrees(rep.map_or(0.0, |s| s.temp_max_k)),
                details: details(rep, sunrise, sunset, tz),
            }
        })
        .collect()
}

/// `(label, value)` pairs of the selected metric.
pub fn metric_series<Tz>(samples: &[ForecastSample], tz: &Tz, metric: Metric) -> Vec<(String, f64)>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    forecast::to_chart_series(samples, tz)
        .into_iter()
        .map(|point| {
            let value = metric.value(&point);
            (point.label, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::tests::{DEC_19, sample_at, week_of_samples};
    use chrono::Utc;

    fn city() -> CityInfo {
        CityInfo {
            name: "London".to_string(),
            country: Some("GB".to_string()),
            latitude: 51.5085,
            longitude: -0.1257,
            // 07:30 and 15:00 UTC on 2023-12-19
            sunrise: DEC_19 + 27_000,
            sunset: DEC_19 + 54_000,
        }
    }

    #[test]
    fn header_names_city_and_coordinates() {
        let h = header(&city());
        assert_eq!(h.location, "London, GB");
        assert_eq!(h.coordinates, "Latitude: 51.5085°, Longitude: -0.1257°");
    }

    #[test]
    fn current_conditions_from_first_sample() {
        let samples = week_of_samples();
        let now = current_conditions(&samples, Some(&city()), &Utc, &ViewOptions::default());

        assert_eq!(now.weekday, "Tuesday");
        assert_eq!(now.date, "19.12.2023");
        assert_eq!(now.temperature, "23°");
        assert_eq!(now.feels_like, "22°");
        assert_eq!(now.description, "clear sky");
        // Midnight sample renders the night icon
        assert_eq!(now.icon, "01n");
        assert_eq!(now.details.visibility, "10 km");
        assert_eq!(now.details.pressure, "1013 hPa");
        assert_eq!(now.details.humidity, "64%");
        assert_eq!(now.details.wind_speed, "6 km/h");
        assert_eq!(now.details.sunrise, "7:30");
        assert_eq!(now.details.sunset, "15:00");
    }

    #[test]
    fn current_conditions_fall_back_to_defaults() {
        let now = current_conditions(&[], None, &Utc, &ViewOptions::default());

        assert_eq!(now.weekday, "");
        assert_eq!(now.date, "");
        assert_eq!(now.temperature, "23°");
        assert_eq!(now.feels_like, "-273°");
        assert_eq!(now.description, "");
        assert_eq!(now.icon, "");
        assert_eq!(now.details.visibility, "10 km");
        assert_eq!(now.details.pressure, "-");
        assert_eq!(now.details.humidity, "-");
        assert_eq!(now.details.wind_speed, "6 km/h");
        assert!(!now.details.sunrise.is_empty());
    }

    #[test]
    fn hourly_strip_covers_every_sample() {
        let samples = week_of_samples();
        let strip = hourly_strip(&samples, &Utc, &ViewOptions::default());

        assert_eq!(strip.len(), samples.len());
        assert_eq!(strip[0].time, "12:00 AM");
        assert_eq!(strip[0].icon, "01n");
        assert_eq!(strip[3].time, "9:00 AM");
        assert_eq!(strip[3].icon, "01d");
        assert_eq!(strip[5].time, "3:00 PM");
    }

    #[test]
    fn daily_details_are_bounded_and_use_daytime_sample() {
        let samples = week_of_samples();
        let days = daily_details(&samples, Some(&city()), &Utc, &ViewOptions::default());

        assert_eq!(days.len(), 6);
        assert_eq!(days[0].weekday, "Tuesday");
        assert_eq!(days[0].date, "19.12");
        assert_eq!(days[5].date, "24.12");
        assert_eq!(days[0].temperature, "23°");
        assert_eq!(days[0].details.sunrise, "7:30");

        let unbounded = ViewOptions {
            max_days: None,
            ..ViewOptions::default()
        };
        assert_eq!(daily_details(&samples, None, &Utc, &unbounded).len(), 8);
    }

    #[test]
    fn daily_card_without_daytime_sample_uses_defaults() {
        let samples = vec![sample_at(DEC_19)];
        let days = daily_details(&samples, None, &Utc, &ViewOptions::default());

        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.weekday, "");
        assert_eq!(day.date, "");
        assert_eq!(day.icon, DEFAULT_DAILY_ICON);
        assert_eq!(day.temperature, "-273°");
        assert_eq!(day.details.visibility, "10 km");
        assert_eq!(day.details.wind_speed, "6 km/h");
    }

    #[test]
    fn metric_series_selects_values() {
        let samples = week_of_samples();

        let temps = metric_series(&samples, &Utc, Metric::Temperature);
        assert_eq!(temps.len(), samples.len());
        assert_eq!(temps[0], ("19 Dec 00:00".to_string(), 23.0));

        let humidity = metric_series(&samples, &Utc, Metric::Humidity);
        assert_eq!(humidity[0].1, 64.0);

        let wind = metric_series(&samples, &Utc, Metric::WindSpeed);
        assert_eq!(wind[0].1, 6.0);
    }
}
