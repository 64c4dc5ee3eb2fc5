//! A small tokio HTTP server that feeds requests to a [`Router`](crate::routing::Router).
//!
//! Each connection is read once, parsed, dispatched and answered.

mod config;
mod error;
mod http_server;
mod response;

pub use config::ServerConfig;
pub use error::Error;
pub use http_server::HttpServer;
pub use response::{HttpResponse, StatusCode};
