//! Publish command - sends a file of commands to a running server.

use std::{io::ErrorKind, path::Path};

use lightblocks::{
    Command,
    queue::{QueueEndpoint, http::HttpQueueClient},
};

use crate::cli::PublishArgs;

/// Run the publish command
pub async fn run(args: &PublishArgs) -> Result<(), Box<dyn std::error::Error>> {
    let body = read_commands_file(&args.file).await?;
    let commands = Command::decode_batch(&body)
        .map_err(|e| format!("Failed to parse {}: {e}", args.file.display()))?;

    let endpoint = QueueEndpoint::parse(&args.queue_url)?;
    let client = HttpQueueClient::new(endpoint);

    tracing::info!(count = commands.len(), endpoint = %client.endpoint(), "Publishing commands");
    let sent = client.publish_all(&commands).await?;

    println!("Successfully sent {sent} commands to {}", client.endpoint());
    Ok(())
}

/// Read the command file, distinguishing a missing file from an unreadable one.
async fn read_commands_file(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => return Err(format!("not a regular file: {}", path.display()).into()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(format!("file does not exist: {}", path.display()).into());
        }
        Err(e) => return Err(format!("file is not readable: {}: {e}", path.display()).into()),
    }

    tokio::fs::read(path)
        .await
        .map_err(|e| format!("file is not readable: {}: {e}", path.display()).into())
}
