//! Client error types
//!
//! One flat error enum for the whole client. Callers are expected to branch
//! on the variants ("database not found" vs "not connected" vs "server
//! returned garbage"), never on message text.

use thiserror::Error;

/// Errors that can occur while building statements, talking to the server,
/// or mapping its responses
#[derive(Error, Debug)]
pub enum ClientError {
    /// Operation attempted with no live transport handle
    #[error("not connected")]
    NotConnected,

    /// Response or selection had zero matching rows/series/databases where
    /// at least one was required
    #[error("empty response from server")]
    EmptyResponse,

    /// Response shape violated an expected structural invariant
    #[error("unexpected response from server: {0}")]
    UnexpectedResponse(String),

    /// A statement was constructed without at least one data source
    #[error("statement requires at least one data source")]
    InvalidStatement,

    /// Response carried more series than the single-series mapping supports
    #[error("multi-series responses are not supported")]
    NotSupported,

    /// The server answered the request but reported an error of its own
    #[error("server error: {0}")]
    Server(String),

    /// Transport-level failure
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
