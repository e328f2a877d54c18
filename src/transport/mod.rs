//! Transport layer between this crate and the Claude Code CLI.

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;

use crate::error::Result;

mod subprocess;

pub use subprocess::SubprocessCliTransport;

/// A source of raw JSON messages for one query.
#[async_trait]
pub trait Transport: Send {
    /// Start the underlying process or connection.
    async fn connect(&mut self) -> Result<()>;

    /// Stream the JSON objects produced for the query, in order.
    ///
    /// The stream ends when the peer is done. An unsuccessful exit surfaces
    /// as a final `Err` item.
    fn read_messages(&mut self) -> Pin<Box<dyn Stream<Item = Result<Value>> + Send + '_>>;

    /// Tear down the connection. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;

    fn is_ready(&self) -> bool;
}
