//! Scripted provider for unit tests.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{model::Place, normalize::BasicResponse};

use super::{RichAttempt, WeatherProvider};

#[derive(Debug, Default)]
pub(crate) struct StubProvider {
    pub places: Option<Vec<Place>>,
    pub rich: Option<RichAttempt>,
    pub basic: Option<BasicResponse>,
    pub search_calls: AtomicUsize,
    pub rich_calls: AtomicUsize,
    pub basic_calls: AtomicUsize,
}

impl StubProvider {
    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for StubProvider {
    async fn search_places(&self, _query: &str, _limit: u8) -> Result<Vec<Place>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.places.clone().ok_or_else(|| anyhow!("geocoding unavailable"))
    }

    async fn fetch_rich(&self, _lat: f64, _lon: f64) -> Result<RichAttempt> {
        self.rich_calls.fetch_add(1, Ordering::SeqCst);
        self.rich.clone().ok_or_else(|| anyhow!("connection reset"))
    }

    async fn fetch_basic(&self, _lat: f64, _lon: f64) -> Result<BasicResponse> {
        self.basic_calls.fetch_add(1, Ordering::SeqCst);
        self.basic.clone().ok_or_else(|| anyhow!("status 500"))
    }
}
