//! Per-request dispatch.
//!
//! A dispatch is a loop over explicit states rather than a chain of handlers
//! calling each other, so any number of deferring handlers runs in constant
//! stack depth:
//!
//! ```text
//! Matching ──found──▶ Handling ──respond──▶ Completed
//!    ▲  │                │  │
//!    │  └─none─▶ NotFound │  └─fail──▶ ErrorMatching ──none──▶ Fatal
//!    └────────next────────┘               ▲    │
//!                                         │    ▼
//!                              re-raise ──┴─ ErrorHandling ──respond──▶ Completed
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use log::{debug, error, warn};

use crate::parser::HttpRequest;
use crate::pattern::Captures;
use crate::routing::config::RouterConfig;
use crate::routing::error::DispatchError;
use crate::routing::error_route::ErrorRouteTable;
use crate::routing::failure::{Failure, FailureKind};
use crate::routing::handler::{Outcome, ServerRequest};
use crate::routing::table::{RouteEntry, RoutingBuilder, RoutingTable};
use crate::server::HttpResponse;

/// How a dispatch ended.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A handler or error handler produced this response.
    Completed(HttpResponse),
    /// No route matched. No handler ran after the last deferral.
    NotFound,
    /// Nothing could answer the request.
    Fatal(DispatchError),
    /// The dispatch was cancelled before it finished.
    Cancelled,
}

impl DispatchOutcome {
    /// The response to send: the handler's response, a 404 for not-found,
    /// a generic 500 for fatal outcomes, nothing when cancelled.
    pub fn into_response(self) -> Option<HttpResponse> {
        match self {
            DispatchOutcome::Completed(response) => Some(response),
            DispatchOutcome::NotFound => Some(HttpResponse::not_found()),
            DispatchOutcome::Fatal(_) => Some(HttpResponse::server_fault()),
            DispatchOutcome::Cancelled => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, DispatchOutcome::Completed(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DispatchOutcome::NotFound)
    }
}

/// Per-request position in the tables.
#[derive(Debug)]
struct DispatchCursor {
    /// Next route table position to try.
    index: usize,
    /// Captures of the most recent match.
    captures: Captures,
    /// Error routes already invoked during this dispatch.
    tried: Vec<bool>,
}

impl DispatchCursor {
    fn new(error_routes: usize) -> Self {
        Self {
            index: 0,
            captures: Captures::default(),
            tried: vec![false; error_routes],
        }
    }
}

enum State {
    Matching,
    Handling(usize),
    // The ceiling is the kind of the error route that re-raised, if any.
    ErrorMatching(Failure, Option<&'static FailureKind>),
    ErrorHandling(usize, Failure),
}

/// The frozen router. Cheap to clone; safe to share across tasks.
#[derive(Debug, Clone)]
pub struct Router {
    routes: RoutingTable,
    error_routes: ErrorRouteTable,
    config: RouterConfig,
}

impl Router {
    /// Start building a router.
    pub fn builder() -> RoutingBuilder {
        RoutingBuilder::new()
    }

    pub(crate) fn new(routes: RoutingTable, error_routes: ErrorRouteTable, config: RouterConfig) -> Self {
        Self {
            routes,
            error_routes,
            config,
        }
    }

    pub fn routes(&self) -> &[RouteEntry] {
        self.routes.entries()
    }

    pub fn error_routes(&self) -> &ErrorRouteTable {
        &self.error_routes
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Dispatch `request` through the route table.
    ///
    /// Dropping the returned future cancels the dispatch; no handler runs
    /// after that.
    pub async fn dispatch(&self, request: HttpRequest) -> DispatchOutcome {
        let request = Arc::new(request);
        let mut cursor = DispatchCursor::new(self.error_routes.len());
        let mut state = State::Matching;

        loop {
            state = match state {
                State::Matching => {
                    match self.routes.find(cursor.index, request.method, request.route_path()) {
                        Some((index, captures)) => {
                            cursor.index = index + 1;
                            cursor.captures = captures;
                            State::Handling(index)
                        }
                        None => {
                            debug!("No route for {} {}", request.method, request.route_path());
                            return DispatchOutcome::NotFound;
                        }
                    }
                }

                State::Handling(index) => {
                    let entry = &self.routes.entries()[index];
                    debug!("{} {} -> route #{index} ({entry})", request.method, request.route_path());

                    let handler = entry.handler().clone();
                    let server_request = ServerRequest::with_captures(request.clone(), cursor.captures.clone());
                    let result = self
                        .invoke(async move { handler.call(server_request).await }, || {
                            format!("route #{index} ({entry})")
                        })
                        .await;

                    match result {
                        Ok(Ok(Outcome::Respond(response))) => return DispatchOutcome::Completed(response),
                        Ok(Ok(Outcome::Next)) => {
                            debug!("Route #{index} deferred");
                            cursor.captures = Captures::default();
                            State::Matching
                        }
                        Ok(Err(failure)) => {
                            debug!("Route #{index} failed: {failure}");
                            State::ErrorMatching(failure, None)
                        }
                        Err(fatal) => return Self::fatal(fatal),
                    }
                }

                State::ErrorMatching(failure, ceiling) => {
                    match self.error_routes.resolve_within(failure.kind(), &cursor.tried, ceiling) {
                        Some(index) => {
                            cursor.tried[index] = true;
                            State::ErrorHandling(index, failure)
                        }
                        None => {
                            warn!("No error route for failure: {failure}");
                            return Self::fatal(DispatchError::Unhandled(failure));
                        }
                    }
                }

                State::ErrorHandling(index, failure) => {
                    let entry = &self.error_routes.entries()[index];
                    let kind = entry.kind();
                    debug!("Failure {failure} -> error route #{index} ({kind})");

                    let handler = entry.handler().clone();
                    let server_request = ServerRequest::with_captures(request.clone(), cursor.captures.clone());
                    let result = self
                        .invoke(async move { handler.call(server_request, failure).await }, || {
                            format!("error route #{index} ({kind})")
                        })
                        .await;

                    match result {
                        Ok(Ok(response)) => return DispatchOutcome::Completed(response),
                        Ok(Err(raised)) => {
                            debug!("Error route #{index} re-raised: {raised}");
                            State::ErrorMatching(raised, Some(kind))
                        }
                        Err(fatal) => return Self::fatal(fatal),
                    }
                }
            };
        }
    }

    /// Dispatch `request`, giving up as soon as `cancel` completes.
    pub async fn dispatch_until<C>(&self, request: HttpRequest, cancel: C) -> DispatchOutcome
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                debug!("Dispatch cancelled");
                DispatchOutcome::Cancelled
            }
            outcome = self.dispatch(request) => outcome,
        }
    }

    /// Run one handler invocation with panic isolation and the configured
    /// time bound.
    async fn invoke<T, Fut, L>(&self, call: Fut, label: L) -> Result<Result<T, Failure>, DispatchError>
    where
        Fut: Future<Output = Result<T, Failure>>,
        L: FnOnce() -> String,
    {
        let guarded = AssertUnwindSafe(call).catch_unwind();
        let result = match self.config.handler_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, guarded).await {
                Ok(result) => result,
                Err(_) => return Err(incomplete(label(), timeout)),
            },
            None => guarded.await,
        };

        result.map_err(|panic| DispatchError::Panicked {
            handler: label(),
            message: panic_message(panic.as_ref()),
        })
    }

    fn fatal(err: DispatchError) -> DispatchOutcome {
        error!("Dispatch failed: {err}");
        DispatchOutcome::Fatal(err)
    }
}

fn incomplete(handler: String, timeout: Duration) -> DispatchError {
    warn!("Handler {handler} produced no outcome within {timeout:?}");
    DispatchError::IncompleteHandler { handler, timeout }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
