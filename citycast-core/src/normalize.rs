//! Maps the two upstream response shapes onto [`WeatherSnapshot`].
//!
//! Every field of the upstream structs is optional: a missing number becomes 0,
//! a missing condition becomes "Sunny", a missing or zero epoch becomes an empty
//! time string. Decoding only fails on malformed JSON, never on absent data.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Deserialize;

use crate::{
    model::{Condition, DailyEntry, GENERIC_ICON, HourlyEntry, WeatherSnapshot},
    theme::resolve_theme,
};

pub const MAX_HOURLY: usize = 24;
pub const MAX_DAILY: usize = 7;
pub const UNKNOWN_CITY: &str = "UNKNOWN";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamCondition {
    pub main: Option<String>,
    pub description: Option<String>,
}

/// One Call response: `current` plus `hourly` and `daily` series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichResponse {
    pub timezone_offset: Option<i64>,
    pub current: Option<RichCurrent>,
    pub hourly: Option<Vec<RichHour>>,
    pub daily: Option<Vec<RichDay>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichCurrent {
    pub dt: Option<i64>,
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub uvi: Option<f64>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    #[serde(default)]
    pub weather: Vec<UpstreamCondition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichHour {
    pub dt: Option<i64>,
    pub temp: Option<f64>,
    #[serde(default)]
    pub weather: Vec<UpstreamCondition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichDayTemp {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichDay {
    pub dt: Option<i64>,
    pub temp: Option<RichDayTemp>,
    #[serde(default)]
    pub weather: Vec<UpstreamCondition>,
}

/// Current-conditions response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasicResponse {
    pub name: Option<String>,
    /// Shift from UTC in seconds.
    pub timezone: Option<i64>,
    pub dt: Option<i64>,
    pub main: Option<BasicMain>,
    pub wind: Option<BasicWind>,
    pub sys: Option<BasicSys>,
    #[serde(default)]
    pub weather: Vec<UpstreamCondition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasicMain {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasicWind {
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasicSys {
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

#[derive(Debug, Clone)]
pub enum UpstreamWeather {
    Rich(RichResponse),
    Basic(BasicResponse),
}

/// Normalize either shape and attach the theme for the location-local `now`.
pub fn normalize(upstream: &UpstreamWeather, display_name: Option<&str>, now: DateTime<Utc>) -> WeatherSnapshot {
    match upstream {
        UpstreamWeather::Rich(rich) => normalize_rich(rich, display_name, now),
        UpstreamWeather::Basic(basic) => normalize_basic(basic, display_name, now),
    }
}

fn normalize_rich(rich: &RichResponse, display_name: Option<&str>, now: DateTime<Utc>) -> WeatherSnapshot {
    let offset = utc_offset(rich.timezone_offset);
    let current = rich.current.clone().unwrap_or_default();
    let condition = Condition::from_optional(first_main(&current.weather));

    let hourly = rich
        .hourly
        .iter()
        .flatten()
        .take(MAX_HOURLY)
        .map(|h| HourlyEntry {
            label: format_epoch(h.dt, offset, "%-I %p"),
            icon: forecast_icon(&h.weather).to_string(),
            temperature: round_temp(h.temp.unwrap_or(0.0)),
        })
        .collect();

    let daily = rich
        .daily
        .iter()
        .flatten()
        .take(MAX_DAILY)
        .map(|d| {
            let temp = d.temp.clone().unwrap_or_default();
            DailyEntry {
                label: format_epoch(d.dt, offset, "%a"),
                icon: forecast_icon(&d.weather).to_string(),
                high: round_temp(temp.max.unwrap_or(0.0)),
                low: round_temp(temp.min.unwrap_or(0.0)),
            }
        })
        .collect();

    let last_updated = match current.dt.filter(|dt| *dt > 0) {
        Some(dt) => format_epoch(Some(dt), offset, "%-I:%M %p"),
        None => format_local(now, offset, "%-I:%M %p"),
    };

    WeatherSnapshot {
        city: non_empty(display_name).unwrap_or(UNKNOWN_CITY).to_string(),
        temperature: round_temp(current.temp.unwrap_or(0.0)),
        feels_like: round_temp(current.feels_like.unwrap_or(0.0)),
        theme: resolve_theme(&condition, now.with_timezone(&offset)),
        condition,
        humidity: clamp_humidity(current.humidity),
        wind_speed: clamp_wind(current.wind_speed),
        uv_index: current.uvi,
        sunrise: format_epoch(current.sunrise, offset, "%-I:%M %p"),
        sunset: format_epoch(current.sunset, offset, "%-I:%M %p"),
        last_updated,
        hourly,
        daily,
    }
}

fn normalize_basic(basic: &BasicResponse, display_name: Option<&str>, now: DateTime<Utc>) -> WeatherSnapshot {
    let offset = utc_offset(basic.timezone);
    let main = basic.main.clone().unwrap_or_default();
    let sys = basic.sys.clone().unwrap_or_default();
    let condition = Condition::from_optional(first_main(&basic.weather));

    // Upstream name wins over the caller's name on this path.
    let city = non_empty(basic.name.as_deref())
        .or_else(|| non_empty(display_name))
        .unwrap_or(UNKNOWN_CITY)
        .to_string();

    WeatherSnapshot {
        city,
        temperature: round_temp(main.temp.unwrap_or(0.0)),
        feels_like: round_temp(main.feels_like.unwrap_or(0.0)),
        theme: resolve_theme(&condition, now.with_timezone(&offset)),
        condition,
        humidity: clamp_humidity(main.humidity),
        wind_speed: clamp_wind(basic.wind.as_ref().and_then(|w| w.speed)),
        uv_index: None,
        sunrise: format_epoch(sys.sunrise, offset, "%-I:%M %p"),
        sunset: format_epoch(sys.sunset, offset, "%-I:%M %p"),
        last_updated: format_local(now, offset, "%-I:%M %p"),
        hourly: Vec::new(),
        daily: Vec::new(),
    }
}

/// Nearest integer, half away from zero.
pub fn round_temp(value: f64) -> i32 {
    value.round() as i32
}

fn first_main(weather: &[UpstreamCondition]) -> Option<&str> {
    weather.first().and_then(|w| w.main.as_deref())
}

fn forecast_icon(weather: &[UpstreamCondition]) -> &'static str {
    match first_main(weather) {
        Some(main) if !main.is_empty() => Condition::parse(main).icon_key(),
        _ => GENERIC_ICON,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn clamp_humidity(value: Option<f64>) -> u8 {
    value.unwrap_or(0.0).round().clamp(0.0, 100.0) as u8
}

fn clamp_wind(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0).max(0.0)
}

fn utc_offset(secs: Option<i64>) -> FixedOffset {
    secs.and_then(|s| i32::try_from(s).ok())
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

fn format_epoch(epoch: Option<i64>, offset: FixedOffset, fmt: &str) -> String {
    epoch
        .filter(|secs| *secs != 0)
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| format_local(dt, offset, fmt))
        .unwrap_or_default()
}

fn format_local(dt: DateTime<Utc>, offset: FixedOffset, fmt: &str) -> String {
    dt.with_timezone(&offset).format(fmt).to_string()
}
