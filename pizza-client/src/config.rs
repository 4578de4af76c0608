//! Client configuration

use std::path::PathBuf;

use crate::error::{ClientError, ClientResult};
use crate::http::PizzaApi;
use crate::session::{FileSessionStorage, MemorySessionStorage, SessionStore};

/// Default API prefix of the order backend
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration for connecting to the order backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Path prefix prepended to every endpoint (e.g., "/api/v1")
    pub api_prefix: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Directory holding the persisted session; in-memory when unset
    pub session_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
            session_dir: None,
        }
    }

    /// Load configuration from environment variables
    ///
    /// - `PIZZA_API_URL` (default `http://localhost:8080`)
    /// - `PIZZA_API_PREFIX` (default `/api/v1`)
    /// - `PIZZA_API_TIMEOUT` seconds (default 30)
    /// - `PIZZA_SESSION_DIR` (unset: session is not persisted)
    pub fn from_env() -> ClientResult<Self> {
        let base_url =
            std::env::var("PIZZA_API_URL").unwrap_or_else(|_| "http://localhost:8080".into());
        let mut config = Self::new(base_url);

        if let Ok(prefix) = std::env::var("PIZZA_API_PREFIX") {
            config = config.with_api_prefix(prefix);
        }
        if let Ok(raw) = std::env::var("PIZZA_API_TIMEOUT") {
            let seconds = raw.trim().parse::<u64>().map_err(|_| {
                ClientError::Config(format!("PIZZA_API_TIMEOUT must be a number, got {raw:?}"))
            })?;
            config = config.with_timeout(seconds);
        }
        if let Some(dir) = std::env::var("PIZZA_SESSION_DIR")
            .ok()
            .filter(|s| !s.is_empty())
        {
            config = config.with_session_dir(dir);
        }

        Ok(config)
    }

    /// Set the API prefix
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Persist the session under this directory
    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = Some(dir.into());
        self
    }

    /// Full URL of an endpoint path such as `orders/42`
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        let path = path.trim_start_matches('/');
        if prefix.is_empty() {
            format!("{base}/{path}")
        } else {
            format!("{base}/{prefix}/{path}")
        }
    }

    /// Open the session store, restoring any persisted session
    pub fn open_session(&self) -> ClientResult<SessionStore> {
        match &self.session_dir {
            Some(dir) => SessionStore::restore(FileSessionStorage::new(dir)),
            None => SessionStore::restore(MemorySessionStorage::new()),
        }
    }

    /// Create an API client bound to a session
    pub fn build_api(&self, session: SessionStore) -> ClientResult<PizzaApi> {
        PizzaApi::new(self, session)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
