//! Condition -> presentation theme lookup.

use chrono::{DateTime, FixedOffset, Timelike};
use serde::Serialize;

use crate::model::Condition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ThemeVariant {
    Clear,
    Night,
    Clouds,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
    Default,
}

/// Presentation descriptor attached to every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub variant: ThemeVariant,
    /// Background asset key.
    pub background: &'static str,
    pub text_color: &'static str,
    /// Top-to-bottom gradient stops.
    pub gradient: [&'static str; 3],
    pub icon: &'static str,
}

impl Theme {
    pub const fn of(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Clear => Theme {
                variant,
                background: "sunny",
                text_color: "#fff",
                gradient: ["#4FACFE", "#00F2FE", "#FFD86F"],
                icon: "sunny",
            },
            ThemeVariant::Night => Theme {
                variant,
                background: "night",
                text_color: "#fff",
                gradient: ["#0F2027", "#203A43", "#2C5364"],
                icon: "moon",
            },
            ThemeVariant::Clouds => Theme {
                variant,
                background: "evening",
                text_color: "#222",
                gradient: ["#D7DDE8", "#A3B1C6", "#757F9A"],
                icon: "cloudy",
            },
            ThemeVariant::Rain => Theme {
                variant,
                background: "rain",
                text_color: "#fff",
                gradient: ["#4B6CB7", "#3A506B", "#182848"],
                icon: "rainy",
            },
            ThemeVariant::Thunderstorm => Theme {
                variant,
                background: "rain",
                text_color: "#fff",
                gradient: ["#6A5ACD", "#414345", "#232526"],
                icon: "thunderstorm",
            },
            ThemeVariant::Snow => Theme {
                variant,
                background: "snow",
                text_color: "#000",
                gradient: ["#F5F7FA", "#E6DADA", "#C3CFE2"],
                icon: "snow",
            },
            ThemeVariant::Mist => Theme {
                variant,
                background: "evening",
                text_color: "#222",
                gradient: ["#D3D8DC", "#BDC3C7", "#8E9EAB"],
                icon: "mist",
            },
            ThemeVariant::Default => Theme {
                variant,
                background: "sunny",
                text_color: "#fff",
                gradient: ["#56CCF2", "#2F80ED", "#B2FEFA"],
                icon: "partly-sunny",
            },
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::of(ThemeVariant::Default)
    }
}

/// Hours in [19, 24) and [0, 5) count as night.
pub fn is_night_hour(hour: u32) -> bool {
    !(5..19).contains(&hour)
}

/// Resolve a theme for `condition` at the location-local time `now`.
pub fn resolve_theme(condition: &Condition, now: DateTime<FixedOffset>) -> Theme {
    resolve_theme_at_hour(condition, now.hour())
}

pub fn resolve_theme_at_hour(condition: &Condition, hour: u32) -> Theme {
    let variant = match condition {
        Condition::Clear if is_night_hour(hour) => ThemeVariant::Night,
        Condition::Clear => ThemeVariant::Clear,
        Condition::Clouds => ThemeVariant::Clouds,
        Condition::Rain => ThemeVariant::Rain,
        Condition::Thunderstorm => ThemeVariant::Thunderstorm,
        Condition::Snow => ThemeVariant::Snow,
        Condition::Mist => ThemeVariant::Mist,
        Condition::Other(_) => ThemeVariant::Default,
    };
    Theme::of(variant)
}
