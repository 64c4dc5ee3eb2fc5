//! An ordered, first-match HTTP request router.
//!
//! Routes are registered once at startup and then frozen. For every request
//! the router walks the table in registration order and runs the first route
//! whose method set and path template match. A handler can answer, defer to
//! the next matching route, or fail; failures are routed to error handlers by
//! the nearest ancestor of their failure kind.
//!
//! # Features
//!
//! - A small path template language: `{name}`, `{name:regex}`, `{+greedy}`,
//!   `[optional]` groups, nestable
//! - First-match-wins routing with explicit fall-through (`Outcome::Next`)
//! - Predicate guards over headers, cookies, media types and custom tests
//! - Services mounted under a prefix without knowing the mount point
//! - Error routes resolved by failure-kind hierarchy
//! - Bounded handler execution and panic isolation
//! - A minimal tokio server that drives the router
//!
//! # Examples
//!
//! ## Routing with fall-through
//!
//! ```
//! use microroute_rs::routing::{Outcome, Router, Rules, ServerRequest};
//! use microroute_rs::{HttpRequest, HttpResponse, HttpVersion, Method, StatusCode};
//! use std::collections::HashMap;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! # rt.block_on(async {
//! let mut builder = Router::builder();
//! builder
//!     .get(r"/items/{id:\d+}", |req: ServerRequest| async move {
//!         if req.param("id") == Some("0") {
//!             return Ok(Outcome::Next);
//!         }
//!         Ok(Outcome::Respond(HttpResponse::new(StatusCode::Ok).with_body_string("item")))
//!     })
//!     .unwrap()
//!     .get("/items/{id}", |_req: ServerRequest| async {
//!         Ok(Outcome::Respond(HttpResponse::new(StatusCode::Ok).with_body_string("fallback")))
//!     })
//!     .unwrap();
//! let router = builder.build().unwrap();
//!
//! let request = HttpRequest::new(Method::GET, "/items/0".to_string(), HttpVersion::Http11, HashMap::new());
//! let response = router.dispatch(request).await.into_response().unwrap();
//! assert_eq!(response.body_text(), "fallback");
//! # });
//! ```
//!
//! ## Error handling
//!
//! ```
//! use microroute_rs::routing::{Failure, FailureKind, Outcome, Router, Rules, ServerRequest, ANY};
//! use microroute_rs::{HttpRequest, HttpResponse, HttpVersion, Method, StatusCode};
//! use std::collections::HashMap;
//!
//! static NOT_ALLOWED: FailureKind = FailureKind::child("not-allowed", &ANY);
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! # rt.block_on(async {
//! let mut builder = Router::builder();
//! builder
//!     .get("/admin", |_req: ServerRequest| async {
//!         Err::<Outcome, _>(Failure::new(&NOT_ALLOWED, "admins only"))
//!     })
//!     .unwrap()
//!     .error(&NOT_ALLOWED, |_req: ServerRequest, failure: Failure| async move {
//!         Ok(HttpResponse::new(StatusCode::Forbidden).with_body_string(failure.message().to_string()))
//!     })
//!     .unwrap();
//! let router = builder.build().unwrap();
//!
//! let request = HttpRequest::new(Method::GET, "/admin".to_string(), HttpVersion::Http11, HashMap::new());
//! let response = router.dispatch(request).await.into_response().unwrap();
//! assert_eq!(response.status, StatusCode::Forbidden);
//! # });
//! ```
//!
//! See the `demos` directory for a complete server.

// Export the route template compiler
pub mod pattern;

// Export the routing module
pub mod routing;

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use pattern::{Captures, Error as PatternError, RoutePattern};
pub use routing::{DispatchOutcome, Failure, FailureKind, Outcome, Router, RoutingBuilder, Rules, ServerRequest};
pub use server::{Error as ServerError, HttpResponse, HttpServer, ServerConfig, StatusCode};
