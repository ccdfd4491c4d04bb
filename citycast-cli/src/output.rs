//! Plain-text rendering of core results.

use std::fmt::Write;

use citycast_core::{FavoriteCity, Place, WeatherSnapshot};

pub fn places(places: &[Place]) -> String {
    if places.is_empty() {
        return "No results\n".to_string();
    }

    let mut out = String::new();
    for (i, place) in places.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}  (lat: {:.2} lon: {:.2})", i + 1, place.label(), place.lat, place.lon);
    }
    out
}

pub fn favorites(favorites: &[FavoriteCity]) -> String {
    if favorites.is_empty() {
        return "No saved cities\n".to_string();
    }

    let mut out = String::new();
    for fav in favorites {
        let temp = fav.temp.map_or_else(|| "—".to_string(), |t| format!("{t}°C"));
        let _ = writeln!(out, "{:<28} {:>6}  [{}]", fav.name, temp, fav.id);
    }
    out
}

pub fn snapshot(s: &WeatherSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", s.city);
    let _ = writeln!(out, "Updated: {}", s.last_updated);
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}  {}°C  (feels like {}°)", s.condition, s.temperature, s.feels_like);
    let _ = writeln!(out, "  Humidity {}%   Wind {} m/s", s.humidity, s.wind_speed);
    if let Some(uvi) = s.uv_index {
        let _ = writeln!(out, "  UV index {uvi}");
    }
    let _ = writeln!(out, "  Sunrise {}   Sunset {}", dash_if_empty(&s.sunrise), dash_if_empty(&s.sunset));
    let _ = writeln!(out, "  Theme {:?} [{}]", s.theme.variant, s.theme.gradient.join(" → "));

    if !s.hourly.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Hourly");
        for h in &s.hourly {
            let _ = writeln!(out, "  {:>6}  {:<12} {:>3}°", h.label, h.icon, h.temperature);
        }
    }

    if !s.daily.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Daily");
        for d in &s.daily {
            let _ = writeln!(out, "  {:<4} {:<12} {:>3}° / {:>3}°", d.label, d.icon, d.high, d.low);
        }
    }

    out
}

fn dash_if_empty(s: &str) -> &str {
    if s.is_empty() { "—" } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lists_have_placeholders() {
        assert_eq!(places(&[]), "No results\n");
        assert_eq!(favorites(&[]), "No saved cities\n");
    }

    #[test]
    fn favorites_show_dash_for_unknown_temp() {
        let fav = FavoriteCity {
            id: "1_2".into(),
            name: "Somewhere".into(),
            lat: 1.0,
            lon: 2.0,
            temp: None,
        };
        let out = favorites(&[fav]);
        assert!(out.contains("—"));
        assert!(out.contains("[1_2]"));
    }

    #[test]
    fn places_are_numbered_from_one() {
        let out = places(&[Place {
            name: "Oslo".into(),
            state: None,
            country: Some("NO".into()),
            lat: 59.9133,
            lon: 10.739,
        }]);
        assert_eq!(out, " 1. Oslo, NO  (lat: 59.91 lon: 10.74)\n");
    }
}
