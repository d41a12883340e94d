//! Queue URL parsing.

use std::{fmt, str::FromStr};

use url::Url;

use super::{DEFAULT_QUEUE, errors::QueueError};
use crate::Result;

/// A validated queue location: where the queue server listens and which
/// named queue messages are published to.
///
/// Parsed from URLs such as `http://127.0.0.1:5672/commands`. The scheme must
/// be `http`, a host is required, the port defaults to 80, and the last
/// non-empty path segment names the queue (`commands` when the path is empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEndpoint {
    host: String,
    port: u16,
    queue: String,
}

impl QueueEndpoint {
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input).map_err(|e| QueueError::InvalidUrl {
            url: input.to_string(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" {
            return Err(QueueError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            }
            .into());
        }
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| QueueError::MissingHost {
                url: input.to_string(),
            })?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(80);
        let queue = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .unwrap_or(DEFAULT_QUEUE)
            .to_string();

        Ok(Self { host, port, queue })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Name of the queue on the server.
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Address the queue server binds to, `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Same endpoint on a different port. Used once a port-0 bind has resolved.
    pub fn with_port(&self, port: u16) -> Self {
        Self {
            port,
            ..self.clone()
        }
    }

    /// Full URL messages are POSTed to.
    pub fn publish_url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QueueEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}:{}/queues/{}", self.host, self.port, self.queue)
    }
}

impl FromStr for QueueEndpoint {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
