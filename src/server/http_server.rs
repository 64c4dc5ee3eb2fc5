//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::signal;
use log::{info, warn, error};

use crate::parser::parse_request;
use crate::routing::{DispatchOutcome, Router};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::response::{HttpResponse, StatusCode};

/// An HTTP server driving a frozen [`Router`].
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and router.
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self { config, router }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Log the registered routes.
    fn display_server_info(&self) {
        info!("Registered routes:");
        for (index, route) in self.router.routes().iter().enumerate() {
            info!("  #{index} {route}");
        }
        for entry in self.router.error_routes().entries() {
            info!("  on failure {kind}", kind = entry.kind());
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Server listening on http://{addr}", addr = self.config.addr);
        Ok(listener)
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    fn setup_ctrl_c_handler(shutdown_tx: Arc<mpsc::Sender<()>>, tasks: &mut JoinSet<()>) {
        tasks.spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        });
    }

    /// Accept a connection if there is capacity and spawn its task.
    async fn handle_new_connection(
        mut socket: tokio::net::TcpStream,
        addr: SocketAddr,
        semaphore: Arc<Semaphore>,
        router: Router,
        read_buffer_size: usize,
        tasks: &mut JoinSet<()>,
    ) {
        let permit = match semaphore.try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                let response = HttpResponse::new(StatusCode::ServiceUnavailable)
                    .with_content_type("text/plain")
                    .with_body_string("Server is at capacity, please try again later");
                let _ = socket.write_all(&response.to_bytes()).await;
                return;
            }
        };

        tasks.spawn(async move {
            // Released when the task completes.
            let _permit = permit;

            // Errors stay with this connection; the server keeps accepting.
            if let Err(e) = Self::handle_connection(&mut socket, &router, read_buffer_size).await {
                match e {
                    Error::NotFound(_) => info!("{e}"),
                    Error::IoError(_) => warn!("Connection from {addr} dropped: {e}"),
                    _ => error!("Error handling connection from {addr}: {e}"),
                }
            }
        });
    }

    /// Decide whether an accept error should stop the server.
    async fn handle_connection_error(e: std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        false
    }

    /// Wait up to `timeout` for in-flight connections, then abort the rest.
    async fn perform_shutdown(tasks: &mut JoinSet<()>, timeout: Duration) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let drained = tokio::time::timeout(timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!("Shutdown timed out after {timeout:?}; aborting {len} connections", len = tasks.len());
            tasks.abort_all();
        }
        info!("Server shutdown complete");
    }

    /// Bind `config.addr` and serve until Ctrl+C.
    pub async fn start(&self) -> Result<(), Error> {
        let listener = self.setup_listener().await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener until Ctrl+C or a
    /// fatal accept error.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Error> {
        self.display_server_info();

        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let shutdown_tx = Arc::new(shutdown_tx);
        let mut tasks = JoinSet::new();

        Self::setup_ctrl_c_handler(shutdown_tx.clone(), &mut tasks);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            Self::handle_new_connection(
                                socket,
                                addr,
                                semaphore.clone(),
                                self.router.clone(),
                                self.config.read_buffer_size,
                                &mut tasks
                            ).await;
                        },
                        Err(e) => {
                            if Self::handle_connection_error(e).await {
                                break;
                            }
                        }
                    }
                }
            }
        }

        Self::perform_shutdown(&mut tasks, self.config.shutdown_timeout).await;

        Ok(())
    }

    /// Read one request from `socket`, dispatch it and write the response.
    ///
    /// Not-found and fatal dispatch outcomes are answered (404 / 500) and
    /// also reported as errors.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        router: &Router,
        read_buffer_size: usize,
    ) -> Result<(), Error> {
        let mut buf = vec![0; read_buffer_size];

        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Ok(()); // Connection closed
        }

        let request = match parse_request(&buf[..n]) {
            Ok(req) => req,
            Err(e) => {
                let response = HttpResponse::new(StatusCode::BadRequest)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Error parsing request: {e}"));
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::ParseError(e));
            }
        };

        let path = request.route_path().to_string();
        match router.dispatch(request).await {
            DispatchOutcome::Completed(response) => {
                socket.write_all(&response.to_bytes()).await?;
                Ok(())
            }
            DispatchOutcome::NotFound => {
                socket.write_all(&HttpResponse::not_found().to_bytes()).await?;
                Err(Error::NotFound(path))
            }
            DispatchOutcome::Fatal(e) => {
                socket.write_all(&HttpResponse::server_fault().to_bytes()).await?;
                Err(Error::DispatchError(e))
            }
            DispatchOutcome::Cancelled => Ok(()),
        }
    }
}
