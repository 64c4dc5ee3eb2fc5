//! Error types for the route template compiler.

use thiserror::Error;

/// Errors that can occur while compiling a route template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The template does not start with `/`.
    #[error("Invalid route template '{0}': templates must start with '/'")]
    InvalidTemplate(String),

    /// The template is syntactically broken.
    #[error("Malformed route template '{template}': {reason}")]
    Malformed {
        /// The template as supplied by the caller.
        template: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl Error {
    pub(crate) fn malformed(template: &str, reason: impl Into<String>) -> Self {
        Error::Malformed {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}
