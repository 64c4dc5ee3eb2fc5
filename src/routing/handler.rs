//! Handler contracts.

use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;
use std::sync::Arc;

use crate::parser::HttpRequest;
use crate::pattern::Captures;
use crate::routing::failure::Failure;
use crate::server::HttpResponse;

/// What a route handler decided to do with the request.
#[derive(Debug)]
pub enum Outcome {
    /// The request is answered.
    Respond(HttpResponse),
    /// Let the next matching route have it.
    Next,
}

impl From<HttpResponse> for Outcome {
    fn from(response: HttpResponse) -> Self {
        Outcome::Respond(response)
    }
}

/// Type alias for the boxed future returned by a [`Handler`].
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Outcome, Failure>> + Send>>;

/// Type alias for the boxed future returned by an [`ErrorHandler`].
pub type ErrorHandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Failure>> + Send>>;

/// A route handler.
///
/// Every call must end in exactly one of: a response, [`Outcome::Next`], or
/// a [`Failure`]. Async closures taking a [`ServerRequest`] implement this.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: ServerRequest) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(ServerRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Outcome, Failure>> + Send + 'static,
{
    fn call(&self, request: ServerRequest) -> HandlerFuture {
        Box::pin(self(request))
    }
}

/// An error route handler. It can answer the failure or re-raise one; it
/// cannot hand the request back to the route table.
pub trait ErrorHandler: Send + Sync + 'static {
    fn call(&self, request: ServerRequest, failure: Failure) -> ErrorHandlerFuture;
}

impl<F, Fut> ErrorHandler for F
where
    F: Fn(ServerRequest, Failure) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Failure>> + Send + 'static,
{
    fn call(&self, request: ServerRequest, failure: Failure) -> ErrorHandlerFuture {
        Box::pin(self(request, failure))
    }
}

/// The request as seen by a handler: the parsed request plus the captures of
/// the route that selected this handler.
///
/// Cloning is cheap; the underlying [`HttpRequest`] is shared.
#[derive(Debug, Clone)]
pub struct ServerRequest {
    inner: Arc<HttpRequest>,
    captures: Captures,
}

impl ServerRequest {
    /// Wrap a request with no captures.
    pub fn new(request: HttpRequest) -> Self {
        Self::with_captures(Arc::new(request), Captures::default())
    }

    pub(crate) fn with_captures(inner: Arc<HttpRequest>, captures: Captures) -> Self {
        Self { inner, captures }
    }

    /// Get a named path capture.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.captures.get(name)
    }

    /// All path captures of the current match.
    pub fn params(&self) -> &Captures {
        &self.captures
    }

    pub fn request(&self) -> &HttpRequest {
        &self.inner
    }
}

impl Deref for ServerRequest {
    type Target = HttpRequest;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
