//! Error types for health checking operations

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during health check operations
#[derive(Error, Debug)]
pub enum HealthError {
    /// The health check timed out
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// TCP connection failed
    #[error("tcp connection failed: {0}")]
    Tcp(#[from] std::io::Error),

    /// HTTP transport failed (connection refused, reset, protocol error)
    #[error("http request failed: {0}")]
    Http(#[from] hyper::Error),

    /// The request could not be built (bad URL, bad header)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response status did not match the expectation
    #[error("unexpected status: {0}")]
    UnexpectedStatus(u16),
}
