//! Error types for the HTTP server.

use thiserror::Error;

use crate::parser::Error as ParserError;
use crate::routing::DispatchError;

/// Why serving a connection failed. Every variant except `IoError` has
/// already been answered on the socket when it is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// Answered with 400.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No route matched the path; answered with 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The router produced no response; answered with 500.
    #[error("Dispatch error: {0}")]
    DispatchError(#[from] DispatchError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
