//! Error types for route registration and dispatch.

use std::time::Duration;

use thiserror::Error;

use crate::pattern::Error as PatternError;
use crate::routing::failure::Failure;

/// Errors that can occur while building the routing table.
#[derive(Debug, Error)]
pub enum Error {
    /// A route template or service prefix failed to compile.
    #[error("Route pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// Registration was attempted after `build()`.
    #[error("Routing is frozen: no routes can be added after build()")]
    Frozen,
}

/// Reasons a dispatch ended without any handler producing a response.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A failure was raised and no error route resolved it.
    #[error("Unhandled failure: {0}")]
    Unhandled(#[source] Failure),

    /// A handler neither responded, deferred nor failed in time.
    #[error("Incomplete handler {handler}: no outcome within {timeout:?}")]
    IncompleteHandler {
        /// Which handler, for the logs.
        handler: String,
        timeout: Duration,
    },

    /// A handler panicked.
    #[error("Handler {handler} panicked: {message}")]
    Panicked { handler: String, message: String },
}
