//! HTTP/1.x request parsing.
//!
//! Produces the [`HttpRequest`] the router matches against, with helpers for
//! the header, cookie, media type and query checks used by route guards.

mod request;
mod method;
mod version;
mod error;
mod tests;

// Re-export public items
pub use request::HttpRequest;
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;

// Re-export the parse_request function
pub use request::parse_request;
