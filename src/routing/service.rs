//! Reusable groups of routes.

use crate::routing::error::Error;
use crate::routing::table::ScopedRules;

/// A component that contributes routes without knowing where it is mounted.
///
/// ```
/// use microroute_rs::routing::{Outcome, Router, RoutingError, Rules, ScopedRules, ServerRequest, Service};
/// use microroute_rs::{HttpResponse, StatusCode};
///
/// struct Greeting;
///
/// impl Service for Greeting {
///     fn apply(&self, rules: &mut ScopedRules<'_>) -> Result<(), RoutingError> {
///         rules.get("/{name}", |req: ServerRequest| async move {
///             let name = req.param("name").unwrap_or("stranger").to_string();
///             Ok(Outcome::Respond(HttpResponse::new(StatusCode::Ok).with_body_string(name)))
///         })?;
///         Ok(())
///     }
/// }
///
/// let mut builder = Router::builder();
/// builder.register("/greet", &Greeting).unwrap();
/// let router = builder.build().unwrap();
/// assert_eq!(router.routes()[0].template(), Some("/greet/{name}"));
/// ```
pub trait Service: Send + Sync {
    /// Register this component's routes on `rules`, which prefixes every
    /// template with the mount point.
    fn apply(&self, rules: &mut ScopedRules<'_>) -> Result<(), Error>;
}

impl<F> Service for F
where
    F: Fn(&mut ScopedRules<'_>) -> Result<(), Error> + Send + Sync,
{
    fn apply(&self, rules: &mut ScopedRules<'_>) -> Result<(), Error> {
        self(rules)
    }
}

/// Use a closure as a [`Service`].
///
/// The bound lets the compiler infer the closure's argument type, which a
/// bare closure passed to `register` cannot get.
///
/// ```
/// use microroute_rs::routing::{service_fn, Outcome, Router, Rules};
/// use microroute_rs::{HttpResponse, StatusCode};
///
/// let health = service_fn(|rules| {
///     rules.get("/live", |_req| async {
///         Ok(Outcome::Respond(HttpResponse::new(StatusCode::Ok)))
///     })?;
///     Ok(())
/// });
///
/// let mut builder = Router::builder();
/// builder.register("/health", &health).unwrap();
/// assert_eq!(builder.build().unwrap().routes()[0].template(), Some("/health/live"));
/// ```
pub fn service_fn<F>(f: F) -> F
where
    F: Fn(&mut ScopedRules<'_>) -> Result<(), Error> + Send + Sync,
{
    f
}
