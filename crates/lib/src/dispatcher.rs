//! Applies queued commands to the collection.
//!
//! Scheduling follows the intake order only where it matters for the stored
//! order: `addItem` runs synchronously on the dispatching control flow, so
//! entries are linked in exactly the order their commands were received.
//! `deleteItem`, `getItem` and `getAllItems` are spawned as independent tokio
//! tasks and are never awaited by the run loop. They are guaranteed to be
//! scheduled, not to complete in any particular order; a read spawned after an
//! insert sees that insert, but may or may not see a delete spawned before it.

use std::{future::Future, sync::Arc};

use tokio::task::JoinHandle;

use crate::{
    OrderedMap, Result,
    command::Command,
    queue::Consumer,
    sink::ResultSink,
};

/// How a command was handed off.
#[derive(Debug)]
pub enum Dispatched {
    /// Applied before `dispatch` returned.
    Applied,
    /// Running as a detached task.
    Scheduled(JoinHandle<()>),
}

impl Dispatched {
    /// Wait until the command has finished. The run loop never calls this.
    pub async fn wait(self) {
        if let Dispatched::Scheduled(handle) = self
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "Dispatched command task failed");
        }
    }
}

/// Counters reported when [`Dispatcher::run`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Messages taken off the queue.
    pub received: u64,
    /// Messages dropped because they did not decode into a valid command.
    pub rejected: u64,
}

impl RunSummary {
    /// Messages that were applied or scheduled.
    pub fn dispatched(&self) -> u64 {
        self.received - self.rejected
    }
}

/// Routes commands to an [`OrderedMap`] and read results to a [`ResultSink`].
#[derive(Clone)]
pub struct Dispatcher {
    map: Arc<OrderedMap>,
    sink: Arc<dyn ResultSink>,
}

impl Dispatcher {
    pub fn new(map: Arc<OrderedMap>, sink: Arc<dyn ResultSink>) -> Self {
        Self { map, sink }
    }

    pub fn map(&self) -> &Arc<OrderedMap> {
        &self.map
    }

    /// Apply or schedule one command.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, command: Command) -> Dispatched {
        tracing::debug!(
            command = command.name(),
            key = command.key(),
            "Dispatching command"
        );

        match command {
            Command::AddItem { key, value } => {
                self.map.insert(key, value);
                Dispatched::Applied
            }
            Command::DeleteItem { key } => {
                let map = Arc::clone(&self.map);
                Dispatched::Scheduled(tokio::spawn(async move {
                    map.remove(key.as_str());
                }))
            }
            Command::GetItem { key } => {
                let map = Arc::clone(&self.map);
                let sink = Arc::clone(&self.sink);
                Dispatched::Scheduled(tokio::spawn(async move {
                    let value = map.get(key.as_str()).unwrap_or_default();
                    emit(sink.as_ref(), crate::command::GET_ITEM, vec![value]).await;
                }))
            }
            Command::GetAllItems => {
                let map = Arc::clone(&self.map);
                let sink = Arc::clone(&self.sink);
                Dispatched::Scheduled(tokio::spawn(async move {
                    let values = map.values();
                    emit(sink.as_ref(), crate::command::GET_ALL_ITEMS, values).await;
                }))
            }
        }
    }

    /// Decode, validate and dispatch one raw queue message.
    pub fn dispatch_raw(&self, body: &[u8]) -> Result<Dispatched> {
        let command = Command::decode(body)?;
        Ok(self.dispatch(command))
    }

    /// Consume the queue until it closes or `shutdown` resolves.
    ///
    /// Invalid messages are logged and skipped. Scheduled commands still
    /// running when this returns are left to finish on their own.
    pub async fn run<F>(&self, mut consumer: Consumer, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = RunSummary::default();

        loop {
            tokio::select! {
                message = consumer.next() => {
                    let Some(body) = message else {
                        tracing::info!("Command queue closed");
                        break;
                    };
                    summary.received += 1;
                    if let Err(e) = self.dispatch_raw(&body) {
                        summary.rejected += 1;
                        tracing::warn!(error = %e, "Dropping invalid command");
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("Dispatcher shutting down");
                    break;
                }
            }
        }

        tracing::info!(
            received = summary.received,
            rejected = summary.rejected,
            "Dispatcher stopped"
        );
        summary
    }
}

async fn emit(sink: &dyn ResultSink, command: &'static str, lines: Vec<String>) {
    if let Err(e) = sink.emit(lines).await {
        tracing::error!(command, error = %e, "Failed to write result");
    }
}
