//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Settings for [`HttpServer`](crate::server::HttpServer). Routing behaviour
/// lives in [`RouterConfig`](crate::routing::RouterConfig).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Connections beyond this are answered with 503 and closed.
    pub max_connections: usize,
    /// Bytes read for a single request.
    pub read_buffer_size: usize,
    /// How long shutdown waits for in-flight connections.
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_connections: 1024,
            read_buffer_size: 8192,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}
