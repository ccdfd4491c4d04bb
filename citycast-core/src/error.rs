//! Error taxonomy surfaced to UI collaborators.
//!
//! Provider and storage internals work with `anyhow::Result` and attach context;
//! the orchestration layer maps those failures into one of these variants so the
//! UI can decide how loud to be about them.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    /// Bad user input. Raised before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Geocoding request or decode failure. Callers recover to an empty result list.
    #[error("Search failed: {0}")]
    Search(String),

    /// Both the rich and the basic weather endpoints failed.
    #[error("Weather fetch failed: {0}")]
    WeatherFetch(String),

    /// Persistence read/write failure. Fatal to the operation only.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Short message suitable for a toast or status line.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Type at least 2 letters",
            AppError::Search(_) => "Search failed",
            AppError::WeatherFetch(_) => "Failed to fetch weather",
            AppError::Storage(_) => "Could not save your cities",
            AppError::Config(_) => "citycast is not configured. Run `citycast configure`.",
        }
    }

    /// Errors the UI should report but not treat as fatal for the screen.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Search(_) | AppError::WeatherFetch(_))
    }

    pub(crate) fn search(err: anyhow::Error) -> Self {
        AppError::Search(format!("{err:#}"))
    }

    pub(crate) fn weather_fetch(err: anyhow::Error) -> Self {
        AppError::WeatherFetch(format!("{err:#}"))
    }

    pub(crate) fn storage(err: anyhow::Error) -> Self {
        AppError::Storage(format!("{err:#}"))
    }
}
