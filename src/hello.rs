//! The `hello` example: ask Claude for an overview and stream the answer.

use std::io::{self, Write};

use crate::agent::Agent;
use crate::console::rule;
use crate::credentials::{preview, Credentials};
use crate::outcome::Outcome;
use crate::response::{run_query, QueryFailure};
use crate::types::AgentOptions;
use crate::MODEL;

const PROMPT: &str = "
        Hello Claude! Please help me understand how to use the Claude Code SDK.
        Can you give me a brief overview of what it can do?
        ";

/// Run the example against `agent`, writing everything to `out`.
///
/// Returns `Err` only when `out` itself cannot be written.
pub async fn run<A, W>(agent: &A, credentials: &Credentials, out: &mut W) -> io::Result<Outcome>
where
    A: Agent + ?Sized,
    W: Write,
{
    writeln!(out, "🤖 Claude Code SDK Example (Rust)")?;
    writeln!(out, "==================================\n")?;

    if !credentials.has_any() {
        writeln!(out, "❌ No authentication token found!")?;
        writeln!(out, "Please set CLAUDE_CODE_OAUTH_TOKEN environment variable")?;
        return Ok(Outcome::Failure);
    }

    writeln!(out, "✓ Authentication token found")?;
    if let Some(ref token) = credentials.oauth_token {
        writeln!(out, "  OAuth token: {}", preview(token))?;
    }
    if let Some(ref token) = credentials.session_token {
        writeln!(out, "  Session token: {}", preview(token))?;
    }

    let options = AgentOptions::builder().model(MODEL).build();

    writeln!(out, "📤 Sending prompt to Claude...\n")?;
    writeln!(out, "💬 Claude's Response:")?;
    writeln!(out, "{}", rule('─'))?;

    let streamed = run_query(agent, PROMPT.trim(), &options, |chunk| {
        write!(out, "{}", chunk)?;
        out.flush()
    })
    .await;

    match streamed {
        Ok(response) => {
            writeln!(out, "\n{}", rule('─'))?;
            writeln!(out, "✅ Response complete!")?;
            writeln!(out, "📊 Total characters received: {}", response.char_count())?;
            Ok(Outcome::Success)
        }
        Err(QueryFailure::Agent(err)) => {
            writeln!(out, "❌ Error: {}", err)?;
            Ok(Outcome::Failure)
        }
        Err(QueryFailure::Output(err)) => Err(err),
    }
}
