//! Unit conversions and icon selection used by every dashboard section.
//!
//! All helpers are pure. Anything that depends on a wall clock takes the
//! viewer time zone as a parameter.

use chrono::{DateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

const KELVIN_OFFSET: f64 = 273.15;
const MPS_TO_KMH: f64 = 3.6;

/// First local hour rendered with the day icon.
pub const DAY_START_HOUR: u32 = 6;
/// First local hour rendered with the night icon.
pub const NIGHT_START_HOUR: u32 = 18;

/// Whole degrees Celsius, rounded half away from zero.
pub fn celsius(kelvin: f64) -> f64 {
    (kelvin - KELVIN_OFFSET).round()
}

/// `296.37` -> `"23"`.
pub fn kelvin_to_celsius(kelvin: f64) -> String {
    format!("{}", celsius(kelvin) as i64)
}

/// `10000` -> `"10"`. Integer division, the remainder is dropped.
pub fn meters_to_kilometers(meters: u32) -> String {
    (meters / 1000).to_string()
}

/// `1.64` -> `"6 km/h"`.
pub fn convert_wind_speed(meters_per_second: f64) -> String {
    let kmh = (meters_per_second * MPS_TO_KMH).round() as i64;
    format!("{kmh} km/h")
}

/// Numeric prefix of a string produced by [`convert_wind_speed`].
pub fn wind_speed_value(formatted: &str) -> f64 {
    formatted
        .split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or_default()
}

pub(crate) fn local_datetime<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    DateTime::from_timestamp(timestamp, 0).map(|utc| utc.with_timezone(tz))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconVariant {
    Day,
    Night,
}

impl IconVariant {
    pub fn suffix(self) -> char {
        match self {
            IconVariant::Day => 'd',
            IconVariant::Night => 'n',
        }
    }
}

/// Local hours `[day_start_hour, night_start_hour)` use the day icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    #[serde(default = "default_day_start")]
    pub day_start_hour: u32,
    #[serde(default = "default_night_start")]
    pub night_start_hour: u32,
}

const fn default_day_start() -> u32 {
    DAY_START_HOUR
}

const fn default_night_start() -> u32 {
    NIGHT_START_HOUR
}

impl Default for DayWindow {
    fn default() -> Self {
        Self {
            day_start_hour: DAY_START_HOUR,
            night_start_hour: NIGHT_START_HOUR,
        }
    }
}

impl DayWindow {
    pub fn variant_for_hour(&self, hour: u32) -> IconVariant {
        if hour >= self.day_start_hour && hour < self.night_start_hour {
            IconVariant::Day
        } else {
            IconVariant::Night
        }
    }
}

/// Day or night rendering for a sample taken at `timestamp`.
pub fn icon_variant<Tz: TimeZone>(timestamp: i64, tz: &Tz, window: &DayWindow) -> IconVariant {
    local_datetime(timestamp, tz)
        .map(|dt| window.variant_for_hour(dt.hour()))
        .unwrap_or(IconVariant::Day)
}

/// Rewrites the trailing day/night marker of an icon code, `"10d"` -> `"10n"`.
pub fn day_or_night_icon<Tz: TimeZone>(
    icon: &str,
    timestamp: i64,
    tz: &Tz,
    window: &DayWindow,
) -> String {
    let mut chars = icon.chars();
    if chars.next_back().is_none() {
        return String::new();
    }
    let mut code = chars.as_str().to_string();
    code.push(icon_variant(timestamp, tz, window).suffix());
    code
}
