//! Forecast normalization: flat 3-hour samples into daily buckets and a chart series.
//!
//! Calendar dates are always taken in UTC. The daytime check and the chart
//! labels use the viewer time zone supplied by the caller.

use chrono::{DateTime, NaiveDate, TimeZone, Timelike};
use std::fmt::Display;

use crate::{
    model::{ChartPoint, DailyBucket, ForecastSample},
    units::{self, local_datetime},
};

/// Local hour from which a sample counts as a daytime reading.
pub const DAYTIME_START_HOUR: u32 = 6;

/// Days shown by the forecast view.
pub const DEFAULT_MAX_DAYS: usize = 6;

const CHART_LABEL_FORMAT: &str = "%d %b %H:%M";

/// UTC calendar date of a sample.
pub fn calendar_date(sample: &ForecastSample) -> Option<NaiveDate> {
    DateTime::from_timestamp(sample.timestamp, 0).map(|dt| dt.date_naive())
}

/// Distinct calendar dates in order of first appearance, at most `max_days`
/// of them (`None` keeps every date).
pub fn group_by_date(samples: &[ForecastSample], max_days: Option<usize>) -> Vec<NaiveDate> {
    let limit = max_days.unwrap_or(usize::MAX);
    let mut dates: Vec<NaiveDate> = Vec::new();

    for date in samples.iter().filter_map(calendar_date) {
        if dates.len() >= limit {
            break;
        }
        if !dates.contains(&date) {
            dates.push(date);
        }
    }

    dates
}

/// First sample on `date` whose local hour is at least `daytime_start_hour`.
pub fn pick_representative<'a, Tz: TimeZone>(
    samples: &'a [ForecastSample],
    date: NaiveDate,
    tz: &Tz,
    daytime_start_hour: u32,
) -> Option<&'a ForecastSample> {
    samples.iter().find(|sample| {
        calendar_date(sample) == Some(date)
            && local_datetime(sample.timestamp, tz)
                .is_some_and(|local| local.hour() >= daytime_start_hour)
    })
}

pub fn daily_buckets<'a, Tz: TimeZone>(
    samples: &'a [ForecastSample],
    max_days: Option<usize>,
    tz: &Tz,
    daytime_start_hour: u32,
) -> Vec<DailyBucket<'a>> {
    group_by_date(samples, max_days)
        .into_iter()
        .map(|date| DailyBucket {
            date,
            representative: pick_representative(samples, date, tz, daytime_start_hour),
        })
        .collect()
}

/// One chart point per sample, order preserved.
pub fn to_chart_series<Tz>(samples: &[ForecastSample], tz: &Tz) -> Vec<ChartPoint>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    samples
        .iter()
        .map(|sample| ChartPoint {
            label: local_datetime(sample.timestamp, tz)
                .map(|dt| dt.format(CHART_LABEL_FORMAT).to_string())
                .unwrap_or_default(),
            temperature_c: units::celsius(sample.temperature_k),
            humidity_pct: sample.humidity_pct,
            wind_speed: units::wind_speed_value(&units::convert_wind_speed(
                sample.wind_speed_mps,
            )),
        })
        .collect()
}

/// The sample standing in for "current conditions".
pub fn current_sample(samples: &[ForecastSample]) -> Option<&ForecastSample> {
    samples.first()
}
