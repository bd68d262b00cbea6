use anyhow::{Result, anyhow};
use chrono::{Local, TimeZone};
use chrono_tz::Tz;
use std::fmt::Display;
use weatherwise_core::{
    WeatherData,
    dashboard::{self, CurrentConditions, DailyDetail, HourlyEntry, Metric, ViewOptions, WeatherDetails},
};

/// Viewer time zone used for every clock-dependent value.
#[derive(Debug, Clone, Copy)]
pub enum Zone {
    Local,
    Named(Tz),
}

impl Zone {
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value {
            None => Ok(Zone::Local),
            Some(name) => name
                .parse::<Tz>()
                .map(Zone::Named)
                .map_err(|e| anyhow!("Unknown time zone '{name}': {e}")),
        }
    }
}

const HOURLY_COLUMNS: usize = 8;
const CHART_WIDTH: usize = 56;

/// Terminal stand-in for an OpenWeather icon code.
pub fn icon_glyph(icon: &str) -> &'static str {
    let night = icon.ends_with('n');
    match icon.get(..2) {
        Some("01") if night => "🌙",
        Some("01") => "☀️",
        Some("02") => "⛅",
        Some("03" | "04") => "☁️",
        Some("09" | "10") => "🌧️",
        Some("11") => "⛈️",
        Some("13") => "❄️",
        Some("50") => "🌫️",
        _ => "❓",
    }
}

/// One bar per column, scaled between the series minimum and maximum.
pub fn sparkline(values: &[f64], width: usize) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    if values.is_empty() || width == 0 {
        return String::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = (max - min).max(0.001);
    let width = width.min(values.len());
    (0..width)
        .map(|idx| {
            let src = (idx * values.len() / width).min(values.len() - 1);
            let norm = ((values[src] - min) / span).clamp(0.0, 1.0);
            BARS[(norm * (BARS.len() - 1) as f64).round() as usize]
        })
        .collect()
}

fn details_line(details: &WeatherDetails) -> String {
    format!(
        "Visibility {} | Air pressure {} | Humidity {} | Wind {} | Sunrise {} | Sunset {}",
        details.visibility,
        details.pressure,
        details.humidity,
        details.wind_speed,
        details.sunrise,
        details.sunset
    )
}

fn current_block(now: &CurrentConditions) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", now.weekday, now.date));
    out.push_str(&format!(
        "  {}  {} {}\n",
        now.temperature,
        icon_glyph(&now.icon),
        now.description
    ));
    out.push_str(&format!(
        "  Feels like {}   {}↓ {}↑\n",
        now.feels_like, now.temp_min, now.temp_max
    ));
    out
}

fn hourly_block(strip: &[HourlyEntry]) -> String {
    let mut out = String::new();
    for row in strip.chunks(HOURLY_COLUMNS) {
        let times: Vec<String> = row.iter().map(|h| format!("{:>9}", h.time)).collect();
        let temps: Vec<String> = row
            .iter()
            .map(|h| format!("{:>6} {}", h.temperature, icon_glyph(&h.icon)))
            .collect();
        out.push_str(&format!("  {}\n", times.join(" ")));
        out.push_str(&format!("  {}\n", temps.join(" ")));
    }
    out
}

fn daily_block(days: &[DailyDetail]) -> String {
    let mut out = String::new();
    for day in days {
        out.push_str(&format!(
            "  {} {}  {} {}  {} (feels {})  {}↓ {}↑\n",
            day.weekday,
            day.date,
            icon_glyph(&day.icon),
            day.description,
            day.temperature,
            day.feels_like,
            day.temp_min,
            day.temp_max
        ));
        out.push_str(&format!("      {}\n", details_line(&day.details)));
    }
    out
}

fn home_page_in<Z>(data: &WeatherData, tz: &Z, options: &ViewOptions) -> String
where
    Z: TimeZone,
    Z::Offset: Display,
{
    let header = dashboard::header(&data.city);
    let now = dashboard::current_conditions(&data.list, Some(&data.city), tz, options);
    let strip = dashboard::hourly_strip(&data.list, tz, options);

    let mut out = String::new();
    out.push_str(&format!("📍 {}\n\n", header.location));
    out.push_str(&current_block(&now));
    out.push('\n');
    out.push_str(&hourly_block(&strip));
    out.push('\n');
    out.push_str(&format!("  {}\n", details_line(&now.details)));
    out
}

fn forecast_page_in<Z>(data: &WeatherData, tz: &Z, options: &ViewOptions, metric: Metric) -> String
where
    Z: TimeZone,
    Z::Offset: Display,
{
    let header = dashboard::header(&data.city);
    let days = dashboard::daily_details(&data.list, Some(&data.city), tz, options);
    let series = dashboard::metric_series(&data.list, tz, metric);
    let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();

    let mut out = String::new();
    out.push_str(&format!("{}-Day Forecast for {}\n", days.len(), header.location));
    out.push_str(&format!("{}\n\n", header.coordinates));

    out.push_str(&format!("Weather Trend: {} ({})\n", metric.label(), metric.unit()));
    if let (Some((first, _)), Some((last, _))) = (series.first(), series.last()) {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        out.push_str(&format!("  {}\n", sparkline(&values, CHART_WIDTH)));
        out.push_str(&format!("  {first} .. {last}   min {min} / max {max}\n"));
    }
    out.push('\n');

    out.push_str("Daily Forecast\n");
    out.push_str(&daily_block(&days));
    out
}

/// Current conditions, the hourly strip and the detail row.
pub fn home_page(data: &WeatherData, zone: Zone, options: &ViewOptions) -> String {
    match zone {
        Zone::Local => home_page_in(data, &Local, options),
        Zone::Named(tz) => home_page_in(data, &tz, options),
    }
}

/// Header, trend chart of `metric` and the daily cards.
pub fn forecast_page(data: &WeatherData, zone: Zone, options: &ViewOptions, metric: Metric) -> String {
    match zone {
        Zone::Local => forecast_page_in(data, &Local, options, metric),
        Zone::Named(tz) => forecast_page_in(data, &tz, options, metric),
    }
}
