//! Handler failures and the failure-kind hierarchy.
//!
//! A [`FailureKind`] is a tag with an optional parent tag. Kinds are declared
//! as `static` items and compared by address, so two kinds with the same name
//! are still different kinds:
//!
//! ```
//! use microroute_rs::routing::{Failure, FailureKind, ANY};
//!
//! static STORAGE: FailureKind = FailureKind::child("storage", &ANY);
//! static NOT_FOUND_IN_STORE: FailureKind = FailureKind::child("storage-missing", &STORAGE);
//!
//! assert_eq!(NOT_FOUND_IN_STORE.distance_to(&STORAGE), Some(1));
//! assert_eq!(NOT_FOUND_IN_STORE.distance_to(&ANY), Some(2));
//! assert_eq!(STORAGE.distance_to(&NOT_FOUND_IN_STORE), None);
//!
//! let failure = Failure::new(&NOT_FOUND_IN_STORE, "no such key");
//! assert!(failure.is(&STORAGE));
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::ptr;

use thiserror::Error;

use crate::parser::Error as ParserError;

/// A node in the failure-kind tree.
#[derive(Debug)]
pub struct FailureKind {
    name: &'static str,
    parent: Option<&'static FailureKind>,
}

/// Root of the built-in hierarchy. An error route for `ANY` catches everything.
pub static ANY: FailureKind = FailureKind::root("failure");

/// The request could not be understood (bad body, bad parameters).
pub static BAD_REQUEST: FailureKind = FailureKind::child("bad-request", &ANY);

/// Something went wrong inside the handler.
pub static INTERNAL: FailureKind = FailureKind::child("internal", &ANY);

impl FailureKind {
    /// Declare a kind with no parent.
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// Declare a kind below `parent`.
    pub const fn child(name: &'static str, parent: &'static FailureKind) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static FailureKind> {
        self.parent
    }

    /// Number of parent steps from `self` up to `ancestor`; `Some(0)` when
    /// they are the same kind, `None` when `ancestor` is not on the chain.
    pub fn distance_to(&self, ancestor: &FailureKind) -> Option<usize> {
        let mut current = Some(self);
        let mut distance = 0;
        while let Some(kind) = current {
            if ptr::eq(kind, ancestor) {
                return Some(distance);
            }
            current = kind.parent;
            distance += 1;
        }
        None
    }

    /// Whether `self` is `ancestor` or sits below it.
    pub fn is_a(&self, ancestor: &FailureKind) -> bool {
        self.distance_to(ancestor).is_some()
    }
}

impl PartialEq for FailureKind {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for FailureKind {}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An error raised by a handler.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct Failure {
    kind: &'static FailureKind,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Failure {
    pub fn new(kind: &'static FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a failure of kind [`INTERNAL`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(&INTERNAL, message)
    }

    /// Shorthand for a failure of kind [`BAD_REQUEST`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(&BAD_REQUEST, message)
    }

    /// Attach the underlying error.
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> &'static FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this failure's kind is `kind` or one of its descendants.
    pub fn is(&self, kind: &FailureKind) -> bool {
        self.kind.is_a(kind)
    }
}

impl From<ParserError> for Failure {
    fn from(err: ParserError) -> Self {
        Failure::bad_request(err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Failure::bad_request(format!("invalid JSON: {err}")).with_source(err)
    }
}
