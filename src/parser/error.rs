//! Error types for the HTTP parser.

use thiserror::Error;

/// Why a request could not be parsed or decoded.
///
/// Inside a route handler these convert into a `BAD_REQUEST` failure, so
/// `?` on [`HttpRequest::json`](crate::parser::HttpRequest::json) hands the
/// problem to the error routes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid HTTP path")]
    InvalidPath,

    /// The request line is not `METHOD PATH VERSION`, or the input is not UTF-8.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    /// A header required by the protocol version or by the caller is missing.
    #[error("Required header is missing: {0}")]
    MissingHeader(String),

    /// A header line without a `:` separator.
    #[error("Invalid header format")]
    InvalidHeaderFormat,

    /// `Content-Length` is present but not a non-negative integer.
    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    #[error("Empty request")]
    EmptyRequest,

    /// The body could not be decoded as JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}
