use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::{
    model::Place,
    normalize::{BasicResponse, RichResponse},
};

use super::{RichAttempt, WeatherProvider};

pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org";
pub const DEFAULT_GEO_BASE: &str = "http://api.openweathermap.org";

const DIRECT_GEOCODING_PATH: &str = "/geo/1.0/direct";
const ONECALL_PATH: &str = "/data/3.0/onecall";
const CURRENT_PATH: &str = "/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    api_base: String,
    geo_base: String,
}

impl OpenWeatherProvider {
    /// Point the provider at other hosts, e.g. a proxy or a mock server.
    pub fn with_endpoints(api_key: String, api_base: &str, geo_base: &str) -> Self {
        Self {
            api_key,
            http: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            geo_base: geo_base.trim_end_matches('/').to_string(),
        }
    }

    /// Replace the HTTP client with one that gives up connecting after `timeout`.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = Client::builder()
            .connect_timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(self)
    }

    fn coords_query(&self, lat: f64, lon: f64) -> Vec<(&'static str, String)> {
        vec![
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("units", "metric".to_string()),
            ("appid", self.api_key.clone()),
        ]
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn search_places(&self, query: &str, limit: u8) -> Result<Vec<Place>> {
        let url = format!("{}{DIRECT_GEOCODING_PATH}", self.geo_base);
        tracing::debug!(%url, query, limit, "geocoding request");

        let limit = limit.to_string();
        let res = self
            .http
            .get(&url)
            .query(&[("q", query), ("limit", limit.as_str()), ("appid", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to send request to OpenWeather (geocoding)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read OpenWeather geocoding response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        // Upstream answers `null` for some queries; treat that like no results.
        let places: Option<Vec<Place>> =
            serde_json::from_str(&body).context("Failed to parse OpenWeather geocoding JSON")?;
        Ok(places.unwrap_or_default())
    }

    async fn fetch_rich(&self, lat: f64, lon: f64) -> Result<RichAttempt> {
        let url = format!("{}{ONECALL_PATH}", self.api_base);
        let mut query = self.coords_query(lat, lon);
        query.push(("exclude", "minutely,alerts".to_string()));
        tracing::debug!(%url, lat, lon, "one call request");

        let res = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .context("Failed to send request to OpenWeather (one call)")?;

        let status = res.status();
        if !status.is_success() {
            tracing::debug!(%status, "one call rejected");
            return Ok(RichAttempt::Rejected(status.as_u16()));
        }

        let parsed: RichResponse = read_json(res, "one call").await?;
        Ok(RichAttempt::Ok(parsed))
    }

    async fn fetch_basic(&self, lat: f64, lon: f64) -> Result<BasicResponse> {
        let url = format!("{}{CURRENT_PATH}", self.api_base);
        tracing::debug!(%url, lat, lon, "current weather request");

        let res = self
            .http
            .get(&url)
            .query(&self.coords_query(lat, lon))
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        read_json(res, "current weather").await
    }
}

async fn read_json<T: DeserializeOwned>(res: Response, what: &str) -> Result<T> {
    let status = res.status();
    let body = res
        .text()
        .await
        .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

    if !status.is_success() {
        return Err(anyhow!(
            "OpenWeather {what} request failed with status {}: {}",
            status,
            truncate_body(&body),
        ));
    }

    serde_json::from_str(&body).with_context(|| format!("Failed to parse OpenWeather {what} JSON"))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
