use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Candidate place returned by the geocoding endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Place {
    /// "name, state, country" with absent parts skipped.
    pub fn label(&self) -> String {
        let mut label = self.name.clone();
        for part in [&self.state, &self.country].into_iter().flatten() {
            if !part.is_empty() {
                label.push_str(", ");
                label.push_str(part);
            }
        }
        label
    }

    pub fn favorite_id(&self) -> String {
        favorite_id(self.lat, self.lon)
    }
}

/// Stable favorite identity derived from coordinates, e.g. `51.51_-0.13`.
pub fn favorite_id(lat: f64, lon: f64) -> String {
    format!("{lat}_{lon}")
}

/// Fixed condition vocabulary. Anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Condition {
    Clear,
    Clouds,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
    Other(String),
}

impl Condition {
    /// Label used when upstream does not report a condition at all.
    pub const MISSING: &'static str = "Sunny";

    pub fn parse(main: &str) -> Self {
        match main {
            "Clear" => Condition::Clear,
            "Clouds" => Condition::Clouds,
            "Rain" => Condition::Rain,
            "Thunderstorm" => Condition::Thunderstorm,
            "Snow" => Condition::Snow,
            "Mist" => Condition::Mist,
            other => Condition::Other(other.to_string()),
        }
    }

    pub fn from_optional(main: Option<&str>) -> Self {
        match main {
            Some(s) if !s.is_empty() => Condition::parse(s),
            _ => Condition::Other(Self::MISSING.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Condition::Clear => "Clear",
            Condition::Clouds => "Clouds",
            Condition::Rain => "Rain",
            Condition::Thunderstorm => "Thunderstorm",
            Condition::Snow => "Snow",
            Condition::Mist => "Mist",
            Condition::Other(s) => s,
        }
    }

    pub fn icon_key(&self) -> &'static str {
        match self {
            Condition::Clear => "sunny",
            Condition::Clouds => "cloudy",
            Condition::Rain => "rainy",
            Condition::Thunderstorm => "thunderstorm",
            Condition::Snow => "snow",
            Condition::Mist => "mist",
            Condition::Other(_) => GENERIC_ICON,
        }
    }
}

/// Icon used for forecast entries with no usable condition.
pub const GENERIC_ICON: &str = "cloud";

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Condition> for String {
    fn from(value: Condition) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyEntry {
    pub label: String,
    pub icon: String,
    pub temperature: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyEntry {
    pub label: String,
    pub icon: String,
    pub high: i32,
    pub low: i32,
}

/// Canonical, theme-attached weather record published to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub temperature: i32,
    pub feels_like: i32,
    pub condition: Condition,
    pub humidity: u8,
    pub wind_speed: f64,
    pub uv_index: Option<f64>,
    pub sunrise: String,
    pub sunset: String,
    pub last_updated: String,
    pub hourly: Vec<HourlyEntry>,
    pub daily: Vec<DailyEntry>,
    pub theme: Theme,
}

/// A saved place with its temperature at the time it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteCity {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub temp: Option<i32>,
}

impl FavoriteCity {
    pub fn from_place(place: &Place, temp: Option<i32>) -> Self {
        Self {
            id: place.favorite_id(),
            name: place.label(),
            lat: place.lat,
            lon: place.lon,
            temp,
        }
    }
}
