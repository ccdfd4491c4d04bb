//! Application state and the operations UI collaborators call.
//!
//! All shared state lives in one [`AppState`] value behind a `watch` channel:
//! views subscribe and render, and only the methods on [`WeatherApp`] mutate it.
//!
//! Access is assumed to be sequential from one caller. Two fetches racing each
//! other both publish, and whichever finishes last wins, which is fine since
//! only one weather view is visible. Favorites are read-modify-write against
//! storage without a lock, so concurrent add/remove calls can drop an update.

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    Config,
    clock::{Clock, SystemClock},
    error::AppError,
    favorites::{self, FavoritesStore},
    fetch::{self, FetchOutcome},
    geocode,
    model::{FavoriteCity, Place, WeatherSnapshot},
    provider::{WeatherProvider, provider_from_config},
    storage::{FileStore, KeyValueStore},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub favorites: Vec<FavoriteCity>,
    /// Last successfully fetched snapshot. Failed refreshes never clear it.
    pub weather: Option<WeatherSnapshot>,
    pub search_results: Vec<Place>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct WeatherApp {
    provider: Arc<dyn WeatherProvider>,
    favorites: FavoritesStore,
    clock: Arc<dyn Clock>,
    state: watch::Sender<AppState>,
}

impl WeatherApp {
    pub fn new(provider: Arc<dyn WeatherProvider>, storage: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self {
            provider,
            favorites: FavoritesStore::new(storage),
            clock: Arc::new(SystemClock),
            state,
        }
    }

    /// OpenWeather provider plus file storage under the configured data dir.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(config)?);
        let data_dir = config.data_dir().map_err(|e| AppError::Config(format!("{e:#}")))?;
        Ok(Self::new(provider, Arc::new(FileStore::new(data_dir))))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn favorite(&self, id: &str) -> Option<FavoriteCity> {
        self.state.borrow().favorites.iter().find(|f| f.id == id).cloned()
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Place>, AppError> {
        if let Err(e) = geocode::validate_query(query) {
            self.record_error(&e);
            return Err(e);
        }

        let _loading = self.begin_loading();
        match geocode::search(self.provider.as_ref(), query).await {
            Ok(places) => {
                self.state.send_modify(|s| s.search_results = places.clone());
                Ok(places)
            }
            Err(e) => {
                tracing::warn!(error = %e, query, "place search failed");
                self.state.send_modify(|s| {
                    s.search_results.clear();
                    s.error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    /// Fetch, normalize, theme and publish the weather for a location.
    pub async fn fetch_weather(&self, lat: f64, lon: f64, display_name: Option<&str>) -> Result<WeatherSnapshot, AppError> {
        self.fetch_weather_outcome(lat, lon, display_name).await.into_result()
    }

    /// Like [`fetch_weather`](Self::fetch_weather) but keeps whether the fallback was used.
    pub async fn fetch_weather_outcome(&self, lat: f64, lon: f64, display_name: Option<&str>) -> FetchOutcome {
        let _loading = self.begin_loading();

        let outcome = fetch::fetch_weather(self.provider.as_ref(), self.clock.as_ref(), lat, lon, display_name).await;

        match &outcome {
            FetchOutcome::Primary(snapshot) | FetchOutcome::Fallback(snapshot) => {
                tracing::info!(
                    city = %snapshot.city,
                    temp = snapshot.temperature,
                    condition = %snapshot.condition,
                    degraded = outcome.is_degraded(),
                    "weather updated"
                );
                let snapshot = snapshot.clone();
                self.state.send_modify(|s| s.weather = Some(snapshot));
            }
            FetchOutcome::Failed(e) => {
                tracing::warn!(error = %e, lat, lon, "weather fetch failed, keeping previous snapshot");
                self.record_error(e);
            }
        }

        outcome
    }

    /// Replace in-memory favorites with the stored list.
    pub async fn load_favorites(&self) -> Result<Vec<FavoriteCity>, AppError> {
        match self.favorites.load().await {
            Ok(list) => {
                tracing::debug!(count = list.len(), "favorites loaded");
                self.state.send_modify(|s| s.favorites = list.clone());
                Ok(list)
            }
            Err(e) => {
                let e = AppError::storage(e);
                self.record_error(&e);
                Err(e)
            }
        }
    }

    /// Look up the current temperature for `place` and save it as a favorite.
    pub async fn add_favorite(&self, place: &Place) -> Result<FavoriteCity, AppError> {
        let provider = Arc::clone(&self.provider);
        self.add_favorite_with(place, |lat, lon| async move {
            fetch::current_temperature(provider.as_ref(), lat, lon).await
        })
        .await
    }

    /// Add a favorite using any temperature lookup. Re-adding the same
    /// coordinates replaces the existing entry.
    pub async fn add_favorite_with<F, Fut>(&self, place: &Place, lookup: F) -> Result<FavoriteCity, AppError>
    where
        F: FnOnce(f64, f64) -> Fut,
        Fut: Future<Output = Result<Option<i32>, AppError>>,
    {
        let _loading = self.begin_loading();

        let temp = match lookup(place.lat, place.lon).await {
            Ok(temp) => temp,
            Err(e) => {
                self.record_error(&e);
                return Err(e);
            }
        };

        let item = FavoriteCity::from_place(place, temp);
        let stored = self.stored_favorites().await?;
        self.commit_favorites(favorites::upsert(&stored, item.clone())).await?;

        tracing::info!(id = %item.id, name = %item.name, "favorite saved");
        Ok(item)
    }

    /// Remove by id. Unknown ids are ignored.
    pub async fn remove_favorite(&self, id: &str) -> Result<(), AppError> {
        let stored = self.stored_favorites().await?;
        let after = favorites::remove(&stored, id);
        if after.len() == stored.len() {
            tracing::debug!(id, "remove_favorite: no such id");
            self.state.send_modify(|s| s.favorites = stored);
            return Ok(());
        }

        self.commit_favorites(after).await?;
        tracing::info!(id, "favorite removed");
        Ok(())
    }

    pub async fn clear_favorites(&self) -> Result<(), AppError> {
        let stored = self.stored_favorites().await?;
        if stored.is_empty() {
            self.state.send_modify(|s| s.favorites.clear());
            return Ok(());
        }

        self.commit_favorites(Vec::new()).await?;
        tracing::info!("favorites cleared");
        Ok(())
    }

    /// Mutations start from storage, not from the in-memory copy, which may
    /// never have been loaded in this session.
    async fn stored_favorites(&self) -> Result<Vec<FavoriteCity>, AppError> {
        self.favorites.load().await.map_err(|e| {
            let e = AppError::storage(e);
            self.record_error(&e);
            e
        })
    }

    /// Persist first, publish second: state only changes once storage has it.
    async fn commit_favorites(&self, list: Vec<FavoriteCity>) -> Result<(), AppError> {
        if let Err(e) = self.favorites.save(&list).await {
            let e = AppError::storage(e);
            self.record_error(&e);
            return Err(e);
        }
        self.state.send_modify(|s| s.favorites = list);
        Ok(())
    }

    fn record_error(&self, err: &AppError) {
        self.state.send_modify(|s| s.error = Some(err.to_string()));
    }

    fn begin_loading(&self) -> LoadingGuard<'_> {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        LoadingGuard { state: &self.state }
    }
}

/// Clears the loading flag however the operation exits.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<AppState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock,
        normalize::{BasicMain, BasicResponse},
        provider::{RichAttempt, stub::StubProvider},
        storage::MemoryStore,
    };
    use anyhow::anyhow;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Err(anyhow!("disk unavailable"))
        }

        async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow!("disk full"))
        }
    }

    /// Reads an empty list, refuses every write.
    #[derive(Debug)]
    struct ReadOnlyStore;

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow!("read-only"))
        }
    }

    fn app(stub: impl Into<Arc<StubProvider>>, storage: Arc<dyn KeyValueStore>) -> WeatherApp {
        let stub: Arc<StubProvider> = stub.into();
        WeatherApp::new(stub, storage)
            .with_clock(Arc::new(FixedClock::from_timestamp(1_748_786_400).unwrap()))
    }

    fn basic(temp: f64) -> BasicResponse {
        BasicResponse {
            main: Some(BasicMain { temp: Some(temp), ..BasicMain::default() }),
            ..BasicResponse::default()
        }
    }

    fn place(name: &str, lat: f64, lon: f64) -> Place {
        Place { name: name.into(), state: None, country: Some("GB".into()), lat, lon }
    }

    #[tokio::test]
    async fn short_query_never_reaches_provider() {
        let stub = Arc::new(StubProvider::default());
        let app = app(Arc::clone(&stub), Arc::new(MemoryStore::new()));

        let err = app.search(" x ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(app.state().error.is_some());
        assert!(!app.state().loading);
        assert_eq!(StubProvider::calls(&stub.search_calls), 0);
    }

    #[tokio::test]
    async fn failed_search_clears_results_and_records_error() {
        let stub = StubProvider::default();
        let app = app(stub, Arc::new(MemoryStore::new()));
        app.state.send_modify(|s| s.search_results = vec![place("Old", 1.0, 1.0)]);

        let err = app.search("London").await.unwrap_err();
        assert!(matches!(err, AppError::Search(_)));

        let state = app.state();
        assert!(state.search_results.is_empty());
        assert!(state.error.unwrap().contains("geocoding unavailable"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let stub = StubProvider {
            rich: Some(RichAttempt::Rejected(401)),
            basic: Some(basic(12.0)),
            ..StubProvider::default()
        };
        let good = app(stub, Arc::new(MemoryStore::new()));
        let snapshot = good.fetch_weather(1.0, 2.0, Some("Here")).await.unwrap();

        let failing = app(
            StubProvider { rich: Some(RichAttempt::Rejected(500)), ..StubProvider::default() },
            Arc::new(MemoryStore::new()),
        );
        failing.state.send_modify(|s| s.weather = Some(snapshot.clone()));

        let err = failing.fetch_weather(1.0, 2.0, Some("Here")).await.unwrap_err();
        assert!(matches!(err, AppError::WeatherFetch(_)));

        let state = failing.state();
        assert_eq!(state.weather, Some(snapshot));
        assert!(state.error.is_some());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn subscribers_see_published_snapshot() {
        let stub = StubProvider {
            rich: Some(RichAttempt::Rejected(500)),
            basic: Some(basic(3.0)),
            ..StubProvider::default()
        };
        let app = app(stub, Arc::new(MemoryStore::new()));
        let mut rx = app.subscribe();

        app.fetch_weather(0.0, 0.0, None).await.unwrap();

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert!(!state.loading);
        assert_eq!(state.weather.map(|w| w.temperature), Some(3));
    }

    #[tokio::test]
    async fn add_twice_updates_in_place() {
        let stub = StubProvider { basic: Some(basic(15.4)), ..StubProvider::default() };
        let storage = Arc::new(MemoryStore::new());
        let app = app(stub, storage.clone());

        app.add_favorite(&place("Paris", 48.85, 2.35)).await.unwrap();
        app.add_favorite(&place("London", 51.51, -0.13)).await.unwrap();
        let again = app
            .add_favorite_with(&place("London", 51.51, -0.13), |_, _| async { Ok(Some(9)) })
            .await
            .unwrap();

        let favorites = app.state().favorites;
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[0].id, "51.51_-0.13");
        assert_eq!(favorites[0].temp, Some(9));
        assert_eq!(again.temp, Some(9));

        let stored = FavoritesStore::new(storage).load().await.unwrap();
        assert_eq!(stored, favorites);
    }

    #[tokio::test]
    async fn failed_lookup_does_not_add() {
        let app = app(StubProvider::default(), Arc::new(MemoryStore::new()));

        let err = app.add_favorite(&place("Nowhere", 1.0, 1.0)).await.unwrap_err();
        assert!(matches!(err, AppError::WeatherFetch(_)));
        assert!(app.state().favorites.is_empty());
    }

    #[tokio::test]
    async fn storage_failure_leaves_state_untouched() {
        let app = app(StubProvider::default(), Arc::new(BrokenStore));

        let err = app
            .add_favorite_with(&place("London", 51.51, -0.13), |_, _| async { Ok(Some(15)) })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert!(app.state().favorites.is_empty());
        assert!(!app.state().loading);

        assert!(matches!(app.load_favorites().await, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn remove_unknown_and_clear_empty_are_noops() {
        let app = app(StubProvider::default(), Arc::new(ReadOnlyStore));

        // Neither call writes, so the read-only store never errors.
        app.remove_favorite("missing").await.unwrap();
        app.clear_favorites().await.unwrap();
        assert!(app.state().favorites.is_empty());
    }

    #[tokio::test]
    async fn remove_and_clear_persist() {
        let storage = Arc::new(MemoryStore::new());
        let app = app(StubProvider::default(), storage.clone());

        for (name, lat) in [("A", 1.0), ("B", 2.0), ("C", 3.0)] {
            app.add_favorite_with(&place(name, lat, 0.0), |_, _| async { Ok(None) }).await.unwrap();
        }

        app.remove_favorite("2_0").await.unwrap();
        let ids: Vec<_> = app.state().favorites.into_iter().map(|f| f.id).collect();
        assert_eq!(ids, ["3_0", "1_0"]);
        assert_eq!(app.favorite("1_0").map(|f| f.name), Some("A, GB".to_string()));

        app.clear_favorites().await.unwrap();
        assert!(FavoritesStore::new(storage).load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fresh_session_mutates_the_stored_list() {
        let storage = Arc::new(MemoryStore::new());
        let first = app(StubProvider::default(), storage.clone());
        for (name, lat) in [("A", 1.0), ("B", 2.0)] {
            first.add_favorite_with(&place(name, lat, 0.0), |_, _| async { Ok(None) }).await.unwrap();
        }

        // No load_favorites before mutating.
        let second = app(StubProvider::default(), storage.clone());
        second.add_favorite_with(&place("C", 3.0, 0.0), |_, _| async { Ok(None) }).await.unwrap();
        let stored = FavoritesStore::new(storage.clone()).load().await.unwrap();
        let ids: Vec<_> = stored.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["3_0", "2_0", "1_0"]);
        assert_eq!(second.state().favorites, stored);

        let third = app(StubProvider::default(), storage.clone());
        third.remove_favorite("1_0").await.unwrap();
        assert_eq!(FavoritesStore::new(storage.clone()).load().await.unwrap().len(), 2);

        let fourth = app(StubProvider::default(), storage.clone());
        fourth.clear_favorites().await.unwrap();
        assert!(FavoritesStore::new(storage).load().await.unwrap().is_empty());
        assert!(fourth.state().favorites.is_empty());
    }
}
