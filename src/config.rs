//! Configuration options for the gym dashboard client

use std::path::PathBuf;
use std::time::Duration;

/// Base URL used during development
pub const DEV_ENDPOINT: &str = "http://localhost:1337";

/// Base URL used in production
pub const PROD_ENDPOINT: &str = "https://api.arcadezone.fun";

/// Pick the base URL for the current build profile
pub fn default_endpoint() -> &'static str {
    if cfg!(debug_assertions) {
        DEV_ENDPOINT
    } else {
        PROD_ENDPOINT
    }
}

/// Configuration options for the gym dashboard client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Whether to persist the signed-in profile to durable storage
    pub persist_session: bool,

    /// Directory holding the persisted profile record
    pub storage_dir: PathBuf,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            persist_session: true,
            storage_dir: PathBuf::from(".gymdash"),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the storage directory
    pub fn with_storage_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.storage_dir = value.into();
        self
    }
}
