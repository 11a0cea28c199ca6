//! Error handling for the gym dashboard client

use std::fmt;
use thiserror::Error;

/// Unified error type for the gym dashboard client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication and session errors
    #[error("Authentication error: {0}")]
    Auth(#[from] gymdash_rust_auth::AuthError),

    /// Member record service errors
    #[error("Members error: {0}")]
    Members(#[from] gymdash_rust_members::MembersError),

    /// Directory controller errors
    #[error("Directory error: {0}")]
    Directory(#[from] gymdash_rust_members::DirectoryError),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }
}
