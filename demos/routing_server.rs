//! A routing server showing ordered routes, guards, services and error routes.

use std::time::Duration;

use log::info;
use microroute_rs::routing::{
    Error as RoutingError, Failure, FailureKind, Outcome, RequestPredicate, RouterConfig, Rules, ScopedRules,
    ServerRequest, Service, ANY, BAD_REQUEST,
};
use microroute_rs::{HttpResponse, HttpServer, Method, Router, ServerConfig, StatusCode};
use serde_json::json;

static FORBIDDEN: FailureKind = FailureKind::child("forbidden", &ANY);

fn text(status: StatusCode, body: impl Into<String>) -> Result<Outcome, Failure> {
    Ok(Outcome::Respond(
        HttpResponse::new(status)
            .with_content_type("text/plain")
            .with_body_string(body),
    ))
}

/// A user API that knows nothing about where it is mounted.
struct Users;

impl Service for Users {
    fn apply(&self, rules: &mut ScopedRules<'_>) -> Result<(), RoutingError> {
        rules
            .get("/", |_req| async { text(StatusCode::Ok, "alice, bob") })?
            .get(r"/{id:\d+}", |req: ServerRequest| async move {
                let id = req.param("id").unwrap_or_default().to_string();
                let body = json!({ "id": id });
                let response = HttpResponse::new(StatusCode::Ok)
                    .with_json(&body)
                    .map_err(|e| Failure::internal(e.to_string()))?;
                Ok::<_, Failure>(Outcome::Respond(response))
            })?
            .post("/", |req: ServerRequest| async move {
                let user: serde_json::Value = req.json()?;
                text(StatusCode::Created, format!("created {user}"))
            })?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut builder = Router::builder();
    builder
        .config(RouterConfig {
            handler_timeout: Some(Duration::from_secs(5)),
        })
        .get("/", |_req| async { text(StatusCode::Ok, "Hello, World!") })?
        // Answers only when the request carries an API key, otherwise the
        // next matching route runs.
        .route(
            Method::GET,
            "/admin",
            RequestPredicate::contains_header("x-api-key").then_apply(|_req: ServerRequest| async {
                text(StatusCode::Ok, "welcome, admin")
            }),
        )?
        .get("/admin", |_req| async {
            Err::<Outcome, _>(Failure::new(&FORBIDDEN, "an API key is required"))
        })?
        .register("/users", &Users)?
        .error(&FORBIDDEN, |_req, failure: Failure| async move {
            Ok(HttpResponse::new(StatusCode::Forbidden).with_body_string(failure.message().to_string()))
        })?
        .error(&BAD_REQUEST, |_req, failure: Failure| async move {
            Ok(HttpResponse::new(StatusCode::BadRequest).with_body_string(failure.to_string()))
        })?
        .error(&ANY, |_req, _failure| async {
            Ok(HttpResponse::new(StatusCode::InternalServerError).with_body_string("something went wrong"))
        })?;
    let router = builder.build()?;

    let config = ServerConfig {
        addr: "127.0.0.1:8081".parse()?,
        ..ServerConfig::default()
    };
    info!("Starting server on http://{addr}", addr = config.addr);

    let server = HttpServer::new(config, router);
    server.start().await?;

    Ok(())
}
