//! The conversational agent as seen by the example programs.
//!
//! Both programs talk to Claude through [`Agent`] so they can be exercised
//! against a stub instead of the real CLI.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::Result;
use crate::query::query;
use crate::types::{AgentOptions, Message};

/// Lazy, finite stream of messages produced by one query.
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Agent: Send + Sync {
    /// Submit `prompt` and return the stream of resulting messages.
    async fn query(&self, prompt: &str, options: &AgentOptions) -> Result<MessageStream>;
}

/// [`Agent`] backed by the locally installed Claude Code CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClaudeCli;

#[async_trait]
impl Agent for ClaudeCli {
    async fn query(&self, prompt: &str, options: &AgentOptions) -> Result<MessageStream> {
        let stream = query(prompt.to_owned(), Some(options.clone())).await?;
        Ok(Box::pin(stream))
    }
}
