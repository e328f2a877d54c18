//! Error types for talking to the Claude Code CLI.

use serde_json::Value;
use thiserror::Error;

/// Every failure the agent collaborator can surface.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Raised when the CLI process cannot be started or its pipes misbehave.
    #[error("CLI connection error: {0}")]
    CliConnection(String),

    /// Raised when Claude Code is not found or not installed.
    #[error("CLI not found: {message}")]
    CliNotFound {
        message: String,
        cli_path: Option<String>,
    },

    /// Raised when the CLI process exits unsuccessfully.
    #[error("Process error: {message}")]
    Process {
        message: String,
        exit_code: Option<i32>,
    },

    /// Raised when unable to decode JSON from CLI output.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a JSON line does not have the shape of a message.
    #[error("Message parse error: {message}")]
    MessageParse {
        message: String,
        data: Option<Value>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// Create a CLI not found error with installation hints.
    pub fn cli_not_found(cli_path: Option<String>) -> Self {
        let message = if let Some(ref path) = cli_path {
            format!("Claude Code not found at: {}", path)
        } else {
            "Claude Code not found. Install with:\n  \
             npm install -g @anthropic-ai/claude-code\n\n\
             If already installed locally, try:\n  \
             export PATH=\"$HOME/node_modules/.bin:$PATH\""
                .to_string()
        };
        Self::CliNotFound { message, cli_path }
    }

    /// Create a process error, folding the exit code into the message.
    pub fn process_error(message: impl Into<String>, exit_code: Option<i32>) -> Self {
        let mut msg = message.into();
        if let Some(code) = exit_code {
            msg = format!("{} (exit code: {})", msg, code);
        }
        Self::Process {
            message: msg,
            exit_code,
        }
    }

    pub fn message_parse(message: impl Into<String>, data: Option<Value>) -> Self {
        Self::MessageParse {
            message: message.into(),
            data,
        }
    }
}

/// Result type alias for AgentError.
pub type Result<T> = std::result::Result<T, AgentError>;
