//! Finder error types

use thiserror::Error;

use crate::clickhouse::ClickHouseError;

/// Errors that can occur while resolving a metric path query
#[derive(Error, Debug)]
pub enum FinderError {
    /// Index query against the store failed
    #[error("Index query failed: {0}")]
    Query(#[from] ClickHouseError),

    /// Finder could not be set up
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for finder operations
pub type FinderResult<T> = Result<T, FinderError>;
