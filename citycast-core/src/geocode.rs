//! Forward geocoding: free text to candidate places.

use crate::{error::AppError, model::Place, provider::WeatherProvider};

pub const MIN_QUERY_CHARS: usize = 2;

/// Sent as the request `limit`; results are never truncated locally.
pub const SEARCH_LIMIT: u8 = 5;

/// Trimmed query, or `Validation` if it is shorter than [`MIN_QUERY_CHARS`].
pub fn validate_query(query: &str) -> Result<&str, AppError> {
    let trimmed = query.trim();
    if trimmed.chars().count() < MIN_QUERY_CHARS {
        return Err(AppError::Validation(format!(
            "Search query must be at least {MIN_QUERY_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

pub async fn search(provider: &dyn WeatherProvider, query: &str) -> Result<Vec<Place>, AppError> {
    let query = validate_query(query)?;

    let places = provider
        .search_places(query, SEARCH_LIMIT)
        .await
        .map_err(AppError::search)?;

    tracing::debug!(query, results = places.len(), "geocoding finished");
    Ok(places)
}
