// Error types for visionpool

use thiserror::Error;

/// Errors raised by the caching layer's own plumbing.
///
/// Note that the analysis cache itself never surfaces these to callers of
/// `get`/`set` — backing-store failures degrade to cache-miss behavior.
/// They exist for the store implementations and configuration loading.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors delivered to request-pool callers.
///
/// `Clone` because a single batch failure fans out to every waiter in the
/// batch with the same error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool was torn down before this request was dispatched.
    /// Distinct from a processing failure so callers can tell shutdown
    /// apart from a genuine upstream error.
    #[error("request pool cleared before dispatch")]
    Cleared,

    #[error("batch processor failed: {0}")]
    Processor(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;
