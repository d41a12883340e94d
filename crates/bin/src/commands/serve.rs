//! Serve command - consumes the command queue into an ordered map.

use std::sync::Arc;

use lightblocks::{
    Dispatcher, OrderedMap,
    queue::{self, QueueEndpoint, http::HttpQueueServer},
    sink::FileSink,
};
use tokio::signal::unix::{SignalKind, signal};

use crate::cli::ServeArgs;

/// Run the Lightblocks server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Validate the queue URL before touching the filesystem
    let endpoint = QueueEndpoint::parse(&args.queue_url)?;
    let sink = FileSink::create(&args.output).await?;

    let (publisher, consumer) = queue::channel(args.capacity);
    let server = HttpQueueServer::start(&endpoint, publisher).await?;

    // The map lives for the whole process; its final state is discarded on exit
    let map = Arc::new(OrderedMap::new());
    let dispatcher = Dispatcher::new(Arc::clone(&map), Arc::new(sink));

    println!("Lightblocks consuming from {}", server.endpoint());
    println!("Writing results to {}", args.output.display());
    println!("Press Ctrl+C to shutdown");

    let summary = dispatcher.run(consumer, shutdown_signal()).await;

    println!("\nshutting down server");
    server.shutdown().await;
    tracing::info!(
        entries = map.len(),
        received = summary.received,
        rejected = summary.rejected,
        "Server shut down"
    );
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = interrupt => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
