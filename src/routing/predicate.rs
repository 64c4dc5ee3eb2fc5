//! Request predicates and guarded handlers.
//!
//! A [`RequestPredicate`] is a boolean expression over request facts. It is
//! built with constructors and combinators and only evaluated at dispatch
//! time, once per candidate match:
//!
//! ```
//! use microroute_rs::routing::{Failure, Outcome, RequestPredicate, ServerRequest};
//! use microroute_rs::{HttpResponse, StatusCode};
//!
//! let guard = RequestPredicate::contains_header("x-api-key")
//!     .and(RequestPredicate::accepts("application/json"))
//!     .then_apply(|_req: ServerRequest| async {
//!         Ok::<_, Failure>(Outcome::Respond(HttpResponse::new(StatusCode::Ok)))
//!     });
//! # let _ = guard;
//! ```
//!
//! When the predicate is false and no `otherwise` handler is given, the guard
//! defers to the next route exactly as if the handler had returned
//! [`Outcome::Next`].

use std::fmt;
use std::sync::Arc;

use crate::parser::{HttpRequest, Method};
use crate::routing::handler::{Handler, HandlerFuture, Outcome, ServerRequest};

type CustomTest = Arc<dyn Fn(&HttpRequest) -> bool + Send + Sync>;

#[derive(Clone)]
enum Node {
    ContainsHeader(String),
    HeaderEquals(String, String),
    Accepts(String),
    HasContentType(String),
    ContainsCookie(String),
    ContainsQueryParam(String),
    IsOfMethod(Vec<Method>),
    Custom(CustomTest),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
}

/// A composable test over a request.
#[derive(Clone)]
pub struct RequestPredicate {
    root: Node,
}

impl RequestPredicate {
    fn leaf(root: Node) -> Self {
        Self { root }
    }

    /// The request carries header `name` (case-insensitive).
    pub fn contains_header(name: impl Into<String>) -> Self {
        Self::leaf(Node::ContainsHeader(name.into()))
    }

    /// The request carries header `name` with exactly `value`.
    pub fn header_equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::leaf(Node::HeaderEquals(name.into(), value.into()))
    }

    /// The client's `Accept` header admits `media_type`.
    pub fn accepts(media_type: impl Into<String>) -> Self {
        Self::leaf(Node::Accepts(media_type.into()))
    }

    /// The body is declared as `media_type`.
    pub fn has_content_type(media_type: impl Into<String>) -> Self {
        Self::leaf(Node::HasContentType(media_type.into()))
    }

    /// The `Cookie` header contains cookie `name`.
    pub fn contains_cookie(name: impl Into<String>) -> Self {
        Self::leaf(Node::ContainsCookie(name.into()))
    }

    /// The query string contains parameter `name`.
    pub fn contains_query_param(name: impl Into<String>) -> Self {
        Self::leaf(Node::ContainsQueryParam(name.into()))
    }

    /// The request method is one of `methods`.
    pub fn is_of_method(methods: impl IntoIterator<Item = Method>) -> Self {
        Self::leaf(Node::IsOfMethod(methods.into_iter().collect()))
    }

    /// An arbitrary test. It must be free of side effects; it may run once
    /// per candidate match.
    pub fn custom<F>(test: F) -> Self
    where
        F: Fn(&HttpRequest) -> bool + Send + Sync + 'static,
    {
        Self::leaf(Node::Custom(Arc::new(test)))
    }

    pub fn and(self, other: RequestPredicate) -> Self {
        Self::leaf(Node::And(Box::new(self.root), Box::new(other.root)))
    }

    pub fn or(self, other: RequestPredicate) -> Self {
        Self::leaf(Node::Or(Box::new(self.root), Box::new(other.root)))
    }

    pub fn negate(self) -> Self {
        Self::leaf(Node::Not(Box::new(self.root)))
    }

    /// Evaluate against `request`.
    pub fn test(&self, request: &HttpRequest) -> bool {
        self.root.test(request)
    }

    /// Guard `handler` with this predicate. Any [`Handler`] works, including
    /// another `GuardedHandler`.
    pub fn then_apply<H: Handler>(self, handler: H) -> GuardedHandler {
        GuardedHandler {
            predicate: self,
            then: Arc::new(handler),
            otherwise: None,
        }
    }
}

impl Node {
    fn test(&self, request: &HttpRequest) -> bool {
        match self {
            Node::ContainsHeader(name) => request.has_header(name),
            Node::HeaderEquals(name, value) => request.get_header(name).is_some_and(|v| v == value),
            Node::Accepts(media_type) => request.accepts(media_type),
            Node::HasContentType(media_type) => request.has_content_type(media_type),
            Node::ContainsCookie(name) => request.has_cookie(name),
            Node::ContainsQueryParam(name) => request.has_query_param(name),
            Node::IsOfMethod(methods) => methods.contains(&request.method),
            Node::Custom(test) => test(request),
            Node::And(left, right) => left.test(request) && right.test(request),
            Node::Or(left, right) => left.test(request) || right.test(request),
            Node::Not(inner) => !inner.test(request),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::ContainsHeader(name) => write!(f, "containsHeader({name})"),
            Node::HeaderEquals(name, value) => write!(f, "header({name}={value})"),
            Node::Accepts(media_type) => write!(f, "accepts({media_type})"),
            Node::HasContentType(media_type) => write!(f, "contentType({media_type})"),
            Node::ContainsCookie(name) => write!(f, "containsCookie({name})"),
            Node::ContainsQueryParam(name) => write!(f, "containsQueryParam({name})"),
            Node::IsOfMethod(methods) => write!(f, "method({methods:?})"),
            Node::Custom(_) => write!(f, "custom"),
            Node::And(left, right) => write!(f, "({left:?} and {right:?})"),
            Node::Or(left, right) => write!(f, "({left:?} or {right:?})"),
            Node::Not(inner) => write!(f, "not {inner:?}"),
        }
    }
}

impl fmt::Debug for RequestPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

/// A handler that only runs when its predicate holds.
#[derive(Clone)]
pub struct GuardedHandler {
    predicate: RequestPredicate,
    then: Arc<dyn Handler>,
    otherwise: Option<Arc<dyn Handler>>,
}

impl GuardedHandler {
    /// Run `handler` instead of deferring when the predicate is false.
    pub fn otherwise<H: Handler>(mut self, handler: H) -> Self {
        self.otherwise = Some(Arc::new(handler));
        self
    }

    pub fn predicate(&self) -> &RequestPredicate {
        &self.predicate
    }
}

impl Handler for GuardedHandler {
    fn call(&self, request: ServerRequest) -> HandlerFuture {
        if self.predicate.test(&request) {
            return self.then.call(request);
        }
        match &self.otherwise {
            Some(otherwise) => otherwise.call(request),
            None => Box::pin(async { Ok(Outcome::Next) }),
        }
    }
}

impl fmt::Debug for GuardedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedHandler")
            .field("predicate", &self.predicate)
            .field("otherwise", &self.otherwise.is_some())
            .finish()
    }
}
