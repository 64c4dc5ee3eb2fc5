//! The ordered route table and its builder.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use log::{debug, info};

use crate::parser::Method;
use crate::pattern::{Captures, Error as PatternError, RoutePattern};
use crate::routing::config::RouterConfig;
use crate::routing::dispatcher::Router;
use crate::routing::error::Error;
use crate::routing::error_route::{ErrorRouteEntry, ErrorRouteTable};
use crate::routing::failure::{Failure, FailureKind};
use crate::routing::handler::{ErrorHandler, Handler, Outcome, ServerRequest};
use crate::routing::service::Service;
use crate::server::HttpResponse;

/// The methods a route answers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSet {
    /// Every method.
    Any,
    /// Only the listed methods.
    Only(Vec<Method>),
}

impl MethodSet {
    pub fn contains(&self, method: Method) -> bool {
        match self {
            MethodSet::Any => true,
            MethodSet::Only(methods) => methods.contains(&method),
        }
    }
}

impl From<Method> for MethodSet {
    fn from(method: Method) -> Self {
        MethodSet::Only(vec![method])
    }
}

impl From<Vec<Method>> for MethodSet {
    fn from(methods: Vec<Method>) -> Self {
        MethodSet::Only(methods)
    }
}

impl From<&[Method]> for MethodSet {
    fn from(methods: &[Method]) -> Self {
        MethodSet::Only(methods.to_vec())
    }
}

impl<const N: usize> From<[Method; N]> for MethodSet {
    fn from(methods: [Method; N]) -> Self {
        MethodSet::Only(methods.to_vec())
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodSet::Any => f.write_str("ANY"),
            MethodSet::Only(methods) => {
                let names = methods.iter().map(|m| m.to_string()).collect::<Vec<_>>();
                f.write_str(&names.join(", "))
            }
        }
    }
}

/// One route: methods, compiled path pattern and handler.
///
/// A route without a pattern matches every path.
pub struct RouteEntry {
    methods: MethodSet,
    pattern: Option<RoutePattern>,
    handler: Arc<dyn Handler>,
}

impl RouteEntry {
    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    pub fn pattern(&self) -> Option<&RoutePattern> {
        self.pattern.as_ref()
    }

    pub fn template(&self) -> Option<&str> {
        self.pattern.as_ref().map(RoutePattern::template)
    }

    pub(crate) fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Match `path`, returning the captures on success.
    pub fn match_path(&self, path: &str) -> Option<Captures> {
        match &self.pattern {
            Some(pattern) => pattern.match_with_captures(path),
            None => Some(Captures::default()),
        }
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("methods", &self.methods)
            .field("template", &self.template())
            .finish()
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.methods, self.template().unwrap_or("*"))
    }
}

/// The frozen, ordered route table.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    entries: Arc<[RouteEntry]>,
}

impl RoutingTable {
    fn new(entries: Vec<RouteEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the first entry at or after `from` that accepts `method` and
    /// matches `path`. The method test runs first.
    pub(crate) fn find(&self, from: usize, method: Method, path: &str) -> Option<(usize, Captures)> {
        self.entries
            .iter()
            .enumerate()
            .skip(from)
            .filter(|(_, entry)| entry.methods.contains(method))
            .find_map(|(index, entry)| entry.match_path(path).map(|captures| (index, captures)))
    }
}

/// The registration API shared by [`RoutingBuilder`] and [`ScopedRules`].
///
/// Routes are matched in the order they are registered.
pub trait Rules {
    /// Add a route. `template: None` matches every path (or, inside a
    /// scoped view, the mount point and everything below it).
    fn add_route<H: Handler>(
        &mut self,
        methods: impl Into<MethodSet>,
        template: Option<&str>,
        handler: H,
    ) -> Result<&mut Self, Error>;

    /// Mount `service` under `prefix`.
    fn register<S: Service + ?Sized>(&mut self, prefix: &str, service: &S) -> Result<&mut Self, Error>;

    /// Add an error route. Error routes are global even when added through a
    /// scoped view.
    fn add_error_route<E: ErrorHandler>(&mut self, kind: &'static FailureKind, handler: E) -> Result<&mut Self, Error>;

    /// Add a route with any [`Handler`], such as a
    /// [`GuardedHandler`](crate::routing::GuardedHandler).
    fn route<H: Handler>(&mut self, methods: impl Into<MethodSet>, template: &str, handler: H) -> Result<&mut Self, Error> {
        self.add_route(methods, Some(template), handler)
    }

    /// Add a closure route for `methods`.
    fn on<F, Fut>(&mut self, methods: impl Into<MethodSet>, template: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(ServerRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Outcome, Failure>> + Send + 'static,
    {
        self.add_route(methods, Some(template), handler)
    }

    fn get<F, Fut>(&mut self, template: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(ServerRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Outcome, Failure>> + Send + 'static,
    {
        self.add_route(Method::GET, Some(template), handler)
    }

    fn post<F, Fut>(&mut self, template: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(ServerRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Outcome, Failure>> + Send + 'static,
    {
        self.add_route(Method::POST, Some(template), handler)
    }

    fn put<F, Fut>(&mut self, template: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(ServerRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Outcome, Failure>> + Send + 'static,
    {
        self.add_route(Method::PUT, Some(template), handler)
    }

    fn delete<F, Fut>(&mut self, template: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(ServerRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Outcome, Failure>> + Send + 'static,
    {
        self.add_route(Method::DELETE, Some(template), handler)
    }

    fn patch<F, Fut>(&mut self, template: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(ServerRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Outcome, Failure>> + Send + 'static,
    {
        self.add_route(Method::PATCH, Some(template), handler)
    }

    /// A route for every method on `template`.
    fn any<F, Fut>(&mut self, template: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(ServerRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Outcome, Failure>> + Send + 'static,
    {
        self.add_route(MethodSet::Any, Some(template), handler)
    }

    /// A route for every method on every path in scope.
    fn any_path<F, Fut>(&mut self, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(ServerRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Outcome, Failure>> + Send + 'static,
    {
        self.add_route(MethodSet::Any, None, handler)
    }

    /// Add a closure error route.
    fn error<F, Fut>(&mut self, kind: &'static FailureKind, handler: F) -> Result<&mut Self, Error>
    where
        F: Fn(ServerRequest, Failure) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Failure>> + Send + 'static,
    {
        self.add_error_route(kind, handler)
    }
}

/// Collects routes and error routes during setup.
///
/// [`RoutingBuilder::build`] freezes the builder; every later registration
/// fails with [`Error::Frozen`].
#[derive(Default)]
pub struct RoutingBuilder {
    routes: Vec<RouteEntry>,
    error_routes: Vec<ErrorRouteEntry>,
    config: RouterConfig,
    frozen: bool,
}

impl RoutingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the router configuration.
    pub fn config(&mut self, config: RouterConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Freeze the builder and produce the router.
    ///
    /// An empty table is valid; every request then ends as not-found.
    pub fn build(&mut self) -> Result<Router, Error> {
        self.ensure_open()?;
        self.frozen = true;

        let routes = RoutingTable::new(std::mem::take(&mut self.routes));
        let error_routes = ErrorRouteTable::new(std::mem::take(&mut self.error_routes));
        info!(
            "Routing built with {routes} routes and {errors} error routes",
            routes = routes.len(),
            errors = error_routes.len()
        );

        Ok(Router::new(routes, error_routes, self.config.clone()))
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.frozen {
            Err(Error::Frozen)
        } else {
            Ok(())
        }
    }

    fn push_route(&mut self, entry: RouteEntry) -> Result<(), Error> {
        self.ensure_open()?;
        debug!("Route #{index}: {entry}", index = self.routes.len());
        self.routes.push(entry);
        Ok(())
    }

    fn push_error_route(&mut self, entry: ErrorRouteEntry) -> Result<(), Error> {
        self.ensure_open()?;
        debug!("Error route #{index}: {kind}", index = self.error_routes.len(), kind = entry.kind());
        self.error_routes.push(entry);
        Ok(())
    }
}

impl Rules for RoutingBuilder {
    fn add_route<H: Handler>(
        &mut self,
        methods: impl Into<MethodSet>,
        template: Option<&str>,
        handler: H,
    ) -> Result<&mut Self, Error> {
        ScopedRules::root(self).add_route(methods, template, handler)?;
        Ok(self)
    }

    fn register<S: Service + ?Sized>(&mut self, prefix: &str, service: &S) -> Result<&mut Self, Error> {
        ScopedRules::root(self).register(prefix, service)?;
        Ok(self)
    }

    fn add_error_route<E: ErrorHandler>(&mut self, kind: &'static FailureKind, handler: E) -> Result<&mut Self, Error> {
        self.push_error_route(ErrorRouteEntry::new(kind, Arc::new(handler)))?;
        Ok(self)
    }
}

/// A view of the builder that prefixes every template with a mount point.
///
/// Routes are appended to the shared table in place, so a mounted
/// service's routes sit exactly where `register` was called.
pub struct ScopedRules<'a> {
    builder: &'a mut RoutingBuilder,
    // Normalized: no trailing '/', empty at the root.
    prefix: String,
}

impl<'a> ScopedRules<'a> {
    fn root(builder: &'a mut RoutingBuilder) -> Self {
        Self {
            builder,
            prefix: String::new(),
        }
    }

    /// The mount point of this view (`""` at the root).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn resolve(&self, template: Option<&str>) -> Result<Option<RoutePattern>, Error> {
        match template {
            Some(template) => {
                if !template.starts_with('/') {
                    return Err(PatternError::InvalidTemplate(template.to_string()).into());
                }
                Ok(Some(RoutePattern::compile(&join(&self.prefix, template))?))
            }
            None if self.prefix.is_empty() => Ok(None),
            None => Ok(Some(RoutePattern::compile(&format!("{}[/{{+}}]", self.prefix))?)),
        }
    }
}

impl Rules for ScopedRules<'_> {
    fn add_route<H: Handler>(
        &mut self,
        methods: impl Into<MethodSet>,
        template: Option<&str>,
        handler: H,
    ) -> Result<&mut Self, Error> {
        self.builder.ensure_open()?;
        let pattern = self.resolve(template)?;
        self.builder.push_route(RouteEntry {
            methods: methods.into(),
            pattern,
            handler: Arc::new(handler),
        })?;
        Ok(self)
    }

    fn register<S: Service + ?Sized>(&mut self, prefix: &str, service: &S) -> Result<&mut Self, Error> {
        self.builder.ensure_open()?;
        if !prefix.starts_with('/') {
            return Err(PatternError::InvalidTemplate(prefix.to_string()).into());
        }

        let mount = join(&self.prefix, prefix);
        RoutePattern::compile(&mount)?;
        let mount = mount.trim_end_matches('/').to_string();

        debug!("Registering service at {}", if mount.is_empty() { "/" } else { &mount });
        let routes = self.builder.routes.len();
        let error_routes = self.builder.error_routes.len();
        let mut scoped = ScopedRules {
            builder: &mut *self.builder,
            prefix: mount,
        };
        if let Err(e) = service.apply(&mut scoped) {
            // A service is registered whole or not at all.
            self.builder.routes.truncate(routes);
            self.builder.error_routes.truncate(error_routes);
            return Err(e);
        }
        Ok(self)
    }

    fn add_error_route<E: ErrorHandler>(&mut self, kind: &'static FailureKind, handler: E) -> Result<&mut Self, Error> {
        self.builder.add_error_route(kind, handler)?;
        Ok(self)
    }
}

/// Prepend a normalized prefix. A template of `/` maps to the prefix itself.
fn join(prefix: &str, template: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if template == "/" && !prefix.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}{template}")
    }
}
