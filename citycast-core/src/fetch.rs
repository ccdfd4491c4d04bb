//! Rich endpoint first, one fallback to the basic endpoint.

use crate::{
    clock::Clock,
    error::AppError,
    model::WeatherSnapshot,
    normalize::{UpstreamWeather, normalize, round_temp},
    provider::{RichAttempt, WeatherProvider},
};

/// Which path produced the data, so callers can tell degraded from full success.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Rich endpoint answered; hourly and daily may be populated.
    Primary(WeatherSnapshot),
    /// Rich endpoint rejected the request and the basic endpoint answered.
    Fallback(WeatherSnapshot),
    Failed(AppError),
}

impl FetchOutcome {
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            FetchOutcome::Primary(s) | FetchOutcome::Fallback(s) => Some(s),
            FetchOutcome::Failed(_) => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, FetchOutcome::Fallback(_))
    }

    pub fn into_result(self) -> Result<WeatherSnapshot, AppError> {
        match self {
            FetchOutcome::Primary(s) | FetchOutcome::Fallback(s) => Ok(s),
            FetchOutcome::Failed(e) => Err(e),
        }
    }
}

pub async fn fetch_weather(
    provider: &dyn WeatherProvider,
    clock: &dyn Clock,
    lat: f64,
    lon: f64,
    display_name: Option<&str>,
) -> FetchOutcome {
    let attempt = match provider.fetch_rich(lat, lon).await {
        Ok(attempt) => attempt,
        Err(e) => return FetchOutcome::Failed(AppError::weather_fetch(e)),
    };

    match attempt {
        RichAttempt::Ok(rich) => {
            let upstream = UpstreamWeather::Rich(rich);
            FetchOutcome::Primary(normalize(&upstream, display_name, clock.now()))
        }
        RichAttempt::Rejected(status) => {
            tracing::warn!(status, lat, lon, "rich endpoint rejected request, falling back to current conditions");
            match fetch_current(provider, clock, lat, lon, display_name).await {
                Ok(snapshot) => FetchOutcome::Fallback(snapshot),
                Err(e) => FetchOutcome::Failed(e),
            }
        }
    }
}

/// Current conditions from the basic endpoint only.
pub async fn fetch_current(
    provider: &dyn WeatherProvider,
    clock: &dyn Clock,
    lat: f64,
    lon: f64,
    display_name: Option<&str>,
) -> Result<WeatherSnapshot, AppError> {
    let basic = provider
        .fetch_basic(lat, lon)
        .await
        .map_err(AppError::weather_fetch)?;

    Ok(normalize(&UpstreamWeather::Basic(basic), display_name, clock.now()))
}

/// Last-known temperature for a place, as stored with a favorite.
///
/// A response without a `main` block counts as a failed lookup.
pub async fn current_temperature(provider: &dyn WeatherProvider, lat: f64, lon: f64) -> Result<Option<i32>, AppError> {
    let basic = provider
        .fetch_basic(lat, lon)
        .await
        .map_err(AppError::weather_fetch)?;

    let main = basic
        .main
        .ok_or_else(|| AppError::WeatherFetch("Current conditions response had no `main` block".to_string()))?;

    Ok(main.temp.map(round_temp))
}
