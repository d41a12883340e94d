//! Output sinks for read results.
//!
//! Every read command produces one logical result: a single line for a lookup,
//! one line per value for a full ordered read. A sink writes all lines of one
//! result together so results from concurrently scheduled reads never
//! interleave line by line. Lookups of unknown keys render as an empty line.

mod errors;

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use tokio::{fs::File, io::AsyncWriteExt, sync::Mutex as AsyncMutex};

pub use errors::SinkError;

use crate::Result;

/// Destination for read results.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Write the lines of one result, in order, as a single unit.
    async fn emit(&self, lines: Vec<String>) -> Result<()>;
}

/// Sink appending one value per line to a file.
///
/// The file is created (or truncated) when the sink is opened.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: AsyncMutex<File>,
}

impl FileSink {
    /// Create or truncate the file at `path`.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .await
            .map_err(|source| SinkError::Create {
                path: path.clone(),
                source,
            })?;
        tracing::info!(path = %path.display(), "Opened result output");
        Ok(Self {
            path,
            file: AsyncMutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResultSink for FileSink {
    async fn emit(&self, lines: Vec<String>) -> Result<()> {
        let mut buffer = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in &lines {
            buffer.push_str(line);
            buffer.push('\n');
        }

        let write_error = |source| SinkError::Write {
            path: self.path.clone(),
            source,
        };
        let mut file = self.file.lock().await;
        file.write_all(buffer.as_bytes()).await.map_err(write_error)?;
        file.flush().await.map_err(write_error)?;
        Ok(())
    }
}

/// Sink collecting lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every line emitted so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn emit(&self, lines: Vec<String>) -> Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(lines);
        Ok(())
    }
}
