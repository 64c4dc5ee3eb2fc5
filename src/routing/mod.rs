//! Ordered, first-match request routing.
//!
//! Routes are registered on a [`RoutingBuilder`] and tried in registration
//! order. The first route whose methods and path pattern match runs; it can
//! answer, hand the request to the next matching route with
//! [`Outcome::Next`], or fail. Failures are resolved against the error
//! routes by the nearest ancestor of the failure's [`FailureKind`].

mod config;
mod dispatcher;
mod error;
mod error_route;
mod failure;
mod handler;
mod predicate;
mod service;
mod table;

// Re-export public items
pub use config::RouterConfig;
pub use dispatcher::{DispatchOutcome, Router};
pub use error::{DispatchError, Error};
pub use error::Error as RoutingError;
pub use error_route::{ErrorRouteEntry, ErrorRouteTable};
pub use failure::{Failure, FailureKind, ANY, BAD_REQUEST, INTERNAL};
pub use handler::{ErrorHandler, ErrorHandlerFuture, Handler, HandlerFuture, Outcome, ServerRequest};
pub use predicate::{GuardedHandler, RequestPredicate};
pub use service::{service_fn, Service};
pub use table::{MethodSet, RouteEntry, RoutingBuilder, RoutingTable, Rules, ScopedRules};
