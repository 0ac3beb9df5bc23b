// src/error.rs
//! Domain error type. The HTTP layer maps these onto statuses in
//! api::error; everything below the handlers returns this.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The Shopify Admin API or storefront could not be reached or answered
    /// with a failure.
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    Validation(String),

    /// The resource exists but is not finished yet (a scan still running).
    #[error("not ready: {0}")]
    NotReady(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl Error {
    pub fn upstream(message: impl Into<String>) -> Self {
        Error::Upstream(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Error::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn not_ready(message: impl Into<String>) -> Self {
        Error::NotReady(message.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Upstream(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
