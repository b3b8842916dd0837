//! Errors returned by layouts, flash messages and sessions.
//!
//! Conversions exist from every module error, so the `?` operator works in controller actions.
//! Errors from your own code can be wrapped with [`Error::new`].
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] crate::config::Error),

    #[error("view error: {0}")]
    View(#[from] crate::view::Error),

    #[error("http error: {0}")]
    Http(#[from] crate::http::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] crate::crypto::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot extend the template, the controller doesn't have one")]
    NoTemplate,

    #[error("session group \"{0}\" is not configured")]
    UnknownSessionGroup(String),

    #[error("{0}")]
    Error(#[from] Box<dyn std::error::Error + Sync + Send>),
}

impl Error {
    /// Create new error from any error implementing the standard [`std::error::Error`] trait.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::Error(Box::new(err))
    }
}
