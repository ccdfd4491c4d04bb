//! Core library for `citycast`.
//!
//! This crate defines:
//! - Place search against the OpenWeather geocoding API
//! - Weather fetching with a one-shot fallback from the One Call endpoint to
//!   current conditions
//! - Normalization of both response shapes into [`WeatherSnapshot`]
//! - Condition/time-of-day themes
//! - A persisted favorites list
//!
//! UI code talks to [`WeatherApp`] and renders the [`AppState`] it publishes.

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod favorites;
pub mod fetch;
pub mod geocode;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod storage;
pub mod theme;

pub use app::{AppState, WeatherApp};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::AppError;
pub use fetch::FetchOutcome;
pub use model::{Condition, DailyEntry, FavoriteCity, HourlyEntry, Place, WeatherSnapshot};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use theme::{Theme, ThemeVariant};
