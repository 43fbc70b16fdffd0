//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or internally `Arc`-backed,
/// as [`reqwest::Client`] is) so that Axum can clone the state for each
/// request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// Validated service configuration.
    pub config: Arc<Config>,
    /// Pooled HTTP client for the chat completion upstream.
    pub http: reqwest::Client,
}

impl AppState {
    /// Create a new [`AppState`] from a validated configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}

impl Default for AppState {
    /// Creates a default [`AppState`] with no chat API key, suitable for tests.
    fn default() -> Self {
        Self::new(Config::default())
    }
}
