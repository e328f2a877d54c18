//! # claude-oauth-check
//!
//! Two small programs built on the Claude Code CLI:
//!
//! - `hello` sends a greeting, streams Claude's overview of the SDK to stdout
//!   and reports how many characters arrived.
//! - `test_auth` sends a fixed prompt to verify that the OAuth credential in
//!   `CLAUDE_CODE_OAUTH_TOKEN` (or `CLAUDE_CODE_SESSION`) is accepted, and
//!   prints debugging hints when it is not.
//!
//! Both talk to Claude through the [`Agent`] trait. [`ClaudeCli`] runs the
//! installed `claude` binary in `--print --output-format stream-json` mode
//! and decodes the messages it prints.
//!
//! ```no_run
//! use claude_oauth_check::{hello, ClaudeCli, Credentials};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> std::io::Result<()> {
//!     let outcome = hello::run(&ClaudeCli, &Credentials::from_env(), &mut std::io::stdout()).await?;
//!     std::process::exit(outcome.code().into());
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod agent;
pub mod auth_check;
pub mod console;
pub mod credentials;
pub mod error;
pub mod hello;
pub(crate) mod internal;
pub mod logging;
pub mod outcome;
pub mod query;
pub mod response;
pub mod transport;
pub mod types;

pub use agent::{Agent, ClaudeCli, MessageStream};
pub use credentials::Credentials;
pub use error::{AgentError, Result};
pub use outcome::Outcome;
pub use query::{query, query_with_transport};
pub use response::{QueryFailure, ResponseAccumulator};
pub use transport::Transport;
pub use types::{
    AgentOptions, AgentOptionsBuilder, AssistantMessage, AssistantMessageError, ContentBlock,
    Message, ResultMessage, SystemMessage, UserMessage, UserMessageContent,
};

/// Model both programs ask for.
pub const MODEL: &str = "claude-3-5-sonnet-20241022";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
