//! `QuizServer` builder and accept loop.
//!
//! This is the entry point for running a Quizhall server. It ties the
//! layers together: transport → protocol → engine.

use std::sync::Arc;

use quizhall_engine::{spawn_engine, EngineHandle};
use quizhall_protocol::{Codec, JsonCodec};
use quizhall_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::QuizhallError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// engine handle is itself just a channel sender; no locks here.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) engine: EngineHandle,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Quizhall server.
///
/// # Example
///
/// ```rust,ignore
/// let server = QuizServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct QuizServerBuilder {
    bind_addr: String,
    engine_queue: usize,
}

impl QuizServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            engine_queue: 256,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the engine command queue depth. When the queue fills up,
    /// connection handlers wait rather than pile on.
    pub fn engine_queue(mut self, depth: usize) -> Self {
        self.engine_queue = depth;
        self
    }

    /// Builds the server: binds the listener and spawns the engine.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport` as defaults.
    pub async fn build(self) -> Result<QuizServer<JsonCodec>, QuizhallError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let engine = spawn_engine(self.engine_queue);

        let state = Arc::new(ServerState {
            engine,
            codec: JsonCodec,
        });

        Ok(QuizServer { transport, state })
    }
}

impl Default for QuizServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Quizhall server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct QuizServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl QuizServer<JsonCodec> {
    /// Creates a new builder. Lives on the default-codec type so
    /// `QuizServer::builder()` resolves without a turbofish.
    pub fn builder() -> QuizServerBuilder {
        QuizServerBuilder::new()
    }
}

impl<C> QuizServer<C>
where
    C: Codec,
{
    /// Returns the local address the server is bound to. Useful when
    /// bound to port 0.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, QuizhallError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each
    /// one. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), QuizhallError> {
        tracing::info!("Quizhall server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
