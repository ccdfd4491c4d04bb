use crate::{
    Config,
    error::AppError,
    model::Place,
    normalize::{BasicResponse, RichResponse},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;
#[cfg(test)]
pub(crate) mod stub;

/// Result of asking the rich endpoint: either data or a non-success status.
///
/// Transport and decode failures are errors, not `Rejected`; only an HTTP
/// rejection sends the caller to the basic endpoint.
#[derive(Debug, Clone)]
pub enum RichAttempt {
    Ok(RichResponse),
    Rejected(u16),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Place search, ranked by upstream relevance. `limit` goes into the request.
    async fn search_places(&self, query: &str, limit: u8) -> anyhow::Result<Vec<Place>>;

    /// Current, hourly and daily data in one call.
    async fn fetch_rich(&self, lat: f64, lon: f64) -> anyhow::Result<RichAttempt>;

    /// Current conditions only. Non-success statuses are errors.
    async fn fetch_basic(&self, lat: f64, lon: f64) -> anyhow::Result<BasicResponse>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>, AppError> {
    let api_key = config.api_key().ok_or_else(|| {
        AppError::Config(
            "No API key configured.\n\
             Hint: run `citycast configure` or set CITYCAST_API_KEY."
                .to_string(),
        )
    })?;

    let provider =
        OpenWeatherProvider::with_endpoints(api_key.to_owned(), config.api_base_url(), config.geo_base_url());

    let provider = match config.connect_timeout() {
        Some(timeout) => provider
            .with_connect_timeout(timeout)
            .map_err(|e| AppError::Config(format!("{e:#}")))?,
        None => provider,
    };

    Ok(Box::new(provider))
}
