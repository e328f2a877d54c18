//! Accumulation of the text Claude sends back for one query.

use futures::StreamExt;
use std::io;
use thiserror::Error;

use crate::agent::Agent;
use crate::error::AgentError;
use crate::types::{AgentOptions, Message};

/// Why a query could not be driven to completion.
#[derive(Error, Debug)]
pub enum QueryFailure {
    /// The agent failed to start the query or broke off mid-stream.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Writing streamed text to the console failed.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

/// Running totals for one query: the concatenated text and message count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseAccumulator {
    text: String,
    messages: usize,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one message and return the text payloads it contributed, in
    /// block order. Non-assistant messages count but contribute nothing.
    pub fn absorb<'m>(&mut self, message: &'m Message) -> Vec<&'m str> {
        self.messages += 1;

        let chunks: Vec<&str> = match message {
            Message::Assistant(assistant) => assistant.text_blocks().collect(),
            _ => Vec::new(),
        };
        for chunk in &chunks {
            self.text.push_str(chunk);
        }
        chunks
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of messages observed, of any kind.
    pub fn message_count(&self) -> usize {
        self.messages
    }

    /// Length of the accumulated text in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Submit `prompt` and drain the resulting stream.
///
/// `on_chunk` sees every text payload as soon as it arrives, which lets the
/// caller echo the response while it is still streaming.
pub async fn run_query<A, F>(
    agent: &A,
    prompt: &str,
    options: &AgentOptions,
    mut on_chunk: F,
) -> Result<ResponseAccumulator, QueryFailure>
where
    A: Agent + ?Sized,
    F: FnMut(&str) -> io::Result<()>,
{
    let mut stream = agent.query(prompt, options).await?;
    let mut response = ResponseAccumulator::new();

    while let Some(message) = stream.next().await {
        let message = message?;
        if let Some(error) = message.as_assistant().and_then(|a| a.error) {
            tracing::warn!(?error, "assistant turn reported an error");
        }
        for chunk in response.absorb(&message) {
            on_chunk(chunk).map_err(QueryFailure::Output)?;
        }
    }

    tracing::debug!(
        messages = response.message_count(),
        chars = response.char_count(),
        "query finished"
    );
    Ok(response)
}
