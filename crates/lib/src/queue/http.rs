//! HTTP transport for the command queue.
//!
//! The server side is an axum router with a single endpoint,
//! `POST /queues/{queue}`, whose JSON body is one [`CommandMessage`]. Accepted
//! bodies are forwarded unchanged into a [`Publisher`]. The client side is a
//! reqwest wrapper that publishes messages to a [`QueueEndpoint`].

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use super::{Publisher, QueueEndpoint, errors::QueueError};
use crate::{
    Result,
    command::{Command, CommandMessage},
};

#[derive(Clone)]
struct QueueState {
    queue: Arc<str>,
    publisher: Publisher,
}

/// Running HTTP front end of a queue.
///
/// Dropping the server without calling [`shutdown`](Self::shutdown) also stops
/// it: the listener task exits once its shutdown channel is dropped.
pub struct HttpQueueServer {
    endpoint: QueueEndpoint,
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl HttpQueueServer {
    /// Bind to `endpoint` and start forwarding published messages.
    ///
    /// Port 0 binds an ephemeral port; [`endpoint`](Self::endpoint) reports the
    /// resolved one.
    pub async fn start(endpoint: &QueueEndpoint, publisher: Publisher) -> Result<Self> {
        let address = endpoint.bind_addr();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| QueueError::Bind {
                address: address.clone(),
                reason: e.to_string(),
            })?;
        let local_addr = listener.local_addr().map_err(|e| QueueError::Bind {
            address: address.clone(),
            reason: format!("Failed to get local address: {e}"),
        })?;

        let router = Self::create_router(QueueState {
            queue: Arc::from(endpoint.queue()),
            publisher,
        });
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                tracing::error!(error = %e, "Queue server failed");
            }
        });

        let endpoint = endpoint.with_port(local_addr.port());
        tracing::info!(%local_addr, queue = endpoint.queue(), "Queue server listening");

        Ok(Self {
            endpoint,
            local_addr,
            shutdown: Some(shutdown_tx),
            task,
        })
    }

    fn create_router(state: QueueState) -> Router {
        Router::new()
            .route("/queues/{queue}", post(handle_publish))
            .with_state(state)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Endpoint producers should publish to, with the bound port filled in.
    pub fn endpoint(&self) -> &QueueEndpoint {
        &self.endpoint
    }

    /// Stop accepting requests and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::warn!(error = %e, "Queue server task ended abnormally");
        }
        tracing::info!(local_addr = %self.local_addr, "Queue server stopped");
    }
}

/// Handler for `POST /queues/{queue}`.
async fn handle_publish(
    State(state): State<QueueState>,
    Path(queue): Path<String>,
    body: Bytes,
) -> StatusCode {
    if queue != *state.queue {
        tracing::debug!(queue = %queue, "Publish to unknown queue");
        return StatusCode::NOT_FOUND;
    }
    if let Err(e) = serde_json::from_slice::<CommandMessage>(&body) {
        tracing::warn!(error = %e, "Rejected malformed queue message");
        return StatusCode::BAD_REQUEST;
    }
    match state.publisher.publish(body.to_vec()).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Publishes command messages to a remote queue.
#[derive(Debug, Clone)]
pub struct HttpQueueClient {
    client: reqwest::Client,
    endpoint: QueueEndpoint,
}

impl HttpQueueClient {
    pub fn new(endpoint: QueueEndpoint) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &QueueEndpoint {
        &self.endpoint
    }

    /// Publish one message. Fails unless the server accepted it.
    pub async fn publish(&self, message: &CommandMessage) -> Result<()> {
        let url = self.endpoint.publish_url();
        let response = self
            .client
            .post(&url)
            .json(message)
            .send()
            .await
            .map_err(|e| QueueError::Publish {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(QueueError::Rejected {
                url,
                status: response.status().as_u16(),
            }
            .into());
        }
        Ok(())
    }

    /// Publish commands one after another, in slice order.
    ///
    /// Stops at the first failure. Returns the number of commands published.
    pub async fn publish_all(&self, commands: &[Command]) -> Result<usize> {
        for (published, command) in commands.iter().enumerate() {
            self.publish(&command.to_message()).await.inspect_err(|e| {
                tracing::error!(published, error = %e, "Publishing stopped");
            })?;
        }
        Ok(commands.len())
    }
}
