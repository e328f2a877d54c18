//! The `test_auth` check: confirm Claude answers with the configured credential.

use std::io::{self, Write};

use crate::agent::Agent;
use crate::console::{log, rule, Color};
use crate::credentials::{preview, Credentials, OAUTH_TOKEN_VAR, SESSION_VAR};
use crate::outcome::Outcome;
use crate::response::{run_query, QueryFailure, ResponseAccumulator};
use crate::types::AgentOptions;
use crate::MODEL;

/// Prompt whose only purpose is to get any reply back.
pub const PROMPT: &str =
    "Hello! Please respond with just \"Authentication successful\" if you can read this.";

/// Run the check against `agent`, writing a colored report to `out`.
///
/// Returns `Err` only when `out` itself cannot be written.
pub async fn run<A, W>(agent: &A, credentials: &Credentials, out: &mut W) -> io::Result<Outcome>
where
    A: Agent + ?Sized,
    W: Write,
{
    log(out, Color::Blue, "🔍 Testing Claude Code OAuth Authentication")?;
    writeln!(out, "{}", rule('='))?;

    if !report_environment(credentials, out)? {
        return Ok(Outcome::Failure);
    }

    writeln!(out, "\n🔄 Testing Claude Code SDK...")?;
    let options = AgentOptions::builder().model(MODEL).build();
    log(
        out,
        Color::Blue,
        &format!("📤 Sending test prompt: \"{}\"", PROMPT),
    )?;

    match run_query(agent, PROMPT, &options, |_| Ok(())).await {
        Ok(response) => report_response(&response, out),
        Err(QueryFailure::Agent(err)) => {
            tracing::debug!(error = ?err, "authentication test failed");
            report_failure(&err.to_string(), out)?;
            Ok(Outcome::Failure)
        }
        Err(QueryFailure::Output(err)) => Err(err),
    }
}

/// Print which credentials are set. Returns false when neither is.
fn report_environment<W: Write>(credentials: &Credentials, out: &mut W) -> io::Result<bool> {
    writeln!(out, "\n📋 Environment Check:")?;

    let status = |present: bool| {
        if present {
            (Color::Green, "✓ SET")
        } else {
            (Color::Red, "✗ NOT SET")
        }
    };

    let (color, label) = status(credentials.oauth_token.is_some());
    log(out, color, &format!("  {}: {}", OAUTH_TOKEN_VAR, label))?;
    if let Some(ref token) = credentials.oauth_token {
        log(out, Color::Blue, &format!("    Preview: {}", preview(token)))?;
    }

    let (color, label) = status(credentials.session_token.is_some());
    log(out, color, &format!("  {}: {}", SESSION_VAR, label))?;

    if credentials.has_any() {
        return Ok(true);
    }

    log(out, Color::Red, "\n❌ No authentication tokens found!")?;
    log(
        out,
        Color::Yellow,
        "\nPlease set one of these environment variables:",
    )?;
    writeln!(
        out,
        "  export {}=sk-ant-REDACTED",
        OAUTH_TOKEN_VAR
    )?;
    writeln!(out, "  or run interactive authentication:")?;
    writeln!(out, "  claude auth login")?;
    Ok(false)
}

fn report_response<W: Write>(response: &ResponseAccumulator, out: &mut W) -> io::Result<Outcome> {
    let trimmed = response.text().trim();

    writeln!(out, "\n📥 Received {} message(s)", response.message_count())?;
    log(out, Color::Green, &format!("📝 Response: {}", trimmed))?;

    if trimmed.is_empty() {
        log(out, Color::Yellow, "\n⚠️  WARNING: Empty response received")?;
        log(
            out,
            Color::Yellow,
            "Authentication may be working but Claude didn't respond as expected",
        )?;
        return Ok(Outcome::Failure);
    }

    log(
        out,
        Color::Green,
        "\n🎉 SUCCESS: OAuth authentication is working!",
    )?;
    log(out, Color::Blue, "\n📊 Test Results:")?;
    writeln!(out, "  ✓ Authentication: Working")?;
    writeln!(out, "  ✓ Model: {}", MODEL)?;
    writeln!(
        out,
        "  ✓ Response received: {} characters",
        response.char_count()
    )?;
    writeln!(out, "  ✓ Messages processed: {}", response.message_count())?;
    Ok(Outcome::Success)
}

fn report_failure<W: Write>(details: &str, out: &mut W) -> io::Result<()> {
    log(out, Color::Red, "\n❌ ERROR: Authentication test failed")?;
    log(out, Color::Red, &format!("Error details: {}", details))?;

    writeln!(out, "\n🔧 Debugging steps:")?;
    writeln!(out, "1. Check if Claude Code CLI is installed:")?;
    writeln!(out, "   claude --version")?;
    writeln!(out, "2. Check authentication status:")?;
    writeln!(out, "   claude auth status")?;
    writeln!(out, "3. Try re-authenticating:")?;
    writeln!(out, "   claude auth login")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::MockAgent;
    use crate::console::paint;
    use crate::error::{AgentError, Result};
    use crate::types::{AssistantMessage, ContentBlock, Message, SystemMessage};

    fn oauth_only() -> Credentials {
        Credentials {
            oauth_token: Some("sk-ant-REDACTED".to_string()),
            session_token: None,
        }
    }

    fn agent_yielding(messages: Vec<Result<Message>>) -> MockAgent {
        let mut agent = MockAgent::new();
        agent
            .expect_query()
            .withf(|prompt, options| prompt == PROMPT && options.model.as_deref() == Some(MODEL))
            .times(1)
            .return_once(move |_, _| Ok(Box::pin(futures::stream::iter(messages))));
        agent
    }

    async fn run_to_string(agent: &MockAgent, credentials: &Credentials) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = run(agent, credentials, &mut out).await.unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_missing_credentials_prints_remediation() {
        let mut agent = MockAgent::new();
        agent.expect_query().never();

        let (outcome, output) = run_to_string(&agent, &Credentials::default()).await;

        assert_eq!(outcome, Outcome::Failure);
        assert!(output.contains(&paint(
            Color::Red,
            "  CLAUDE_CODE_OAUTH_TOKEN: ✗ NOT SET"
        )));
        assert!(output.contains(&paint(Color::Red, "  CLAUDE_CODE_SESSION: ✗ NOT SET")));
        assert!(output.contains("No authentication tokens found!"));
        assert!(output.contains("export CLAUDE_CODE_OAUTH_TOKEN=sk-ant-oat01-"));
        assert!(output.contains("claude auth login"));
    }

    #[tokio::test]
    async fn test_success_counts_every_message() {
        let agent = agent_yielding(vec![
            Ok(SystemMessage::new("init").into()),
            Ok(AssistantMessage::new(
                vec![ContentBlock::text("Authentication successful")],
                MODEL,
            )
            .into()),
        ]);

        let (outcome, output) = run_to_string(&agent, &oauth_only()).await;

        assert_eq!(outcome, Outcome::Success);
        assert_eq!(outcome.code(), 0);
        assert!(output.contains(&paint(Color::Green, "  CLAUDE_CODE_OAUTH_TOKEN: ✓ SET")));
        assert!(output.contains(&paint(Color::Blue, "    Preview: sk-ant-oat01-ABCDEFG...")));
        assert!(output.contains("Received 2 message(s)"));
        assert!(output.contains(&paint(
            Color::Green,
            "📝 Response: Authentication successful"
        )));
        assert!(output.contains("SUCCESS: OAuth authentication is working!"));
        assert!(output.contains("  ✓ Model: claude-3-5-sonnet-20241022\n"));
        assert!(output.contains("  ✓ Response received: 25 characters\n"));
        assert!(output.contains("  ✓ Messages processed: 2\n"));
    }

    #[tokio::test]
    async fn test_empty_response_is_a_failure() {
        let agent = agent_yielding(vec![Ok(AssistantMessage::new(vec![], MODEL).into())]);

        let (outcome, output) = run_to_string(&agent, &oauth_only()).await;

        assert_eq!(outcome, Outcome::Failure);
        assert!(output.contains("Received 1 message(s)"));
        assert!(output.contains("WARNING: Empty response received"));
        assert!(!output.contains("SUCCESS"));
    }

    #[tokio::test]
    async fn test_whitespace_only_response_is_empty() {
        let agent = agent_yielding(vec![Ok(AssistantMessage::new(
            vec![ContentBlock::text("  \n")],
            MODEL,
        )
        .into())]);

        let (outcome, output) = run_to_string(&agent, &oauth_only()).await;

        assert_eq!(outcome, Outcome::Failure);
        assert!(output.contains("WARNING: Empty response received"));
    }

    #[tokio::test]
    async fn test_agent_failure_prints_debugging_steps() {
        let agent = agent_yielding(vec![Err(AgentError::CliConnection("boom".to_string()))]);

        let (outcome, output) = run_to_string(&agent, &oauth_only()).await;

        assert_eq!(outcome, Outcome::Failure);
        assert!(output.contains("ERROR: Authentication test failed"));
        assert!(output.contains("boom"));
        assert!(output.contains("1. Check if Claude Code CLI is installed:\n   claude --version"));
        assert!(output.contains("2. Check authentication status:\n   claude auth status"));
        assert!(output.contains("3. Try re-authenticating:\n   claude auth login"));
        assert!(!output.contains("Received"));
    }

    #[tokio::test]
    async fn test_session_only_passes_environment_check() {
        let agent = agent_yielding(vec![Ok(AssistantMessage::new(
            vec![ContentBlock::text("Authentication successful")],
            MODEL,
        )
        .into())]);
        let creds = Credentials {
            oauth_token: None,
            session_token: Some("session-value".to_string()),
        };

        let (outcome, output) = run_to_string(&agent, &creds).await;

        assert_eq!(outcome, Outcome::Success);
        assert!(output.contains(&paint(Color::Red, "  CLAUDE_CODE_OAUTH_TOKEN: ✗ NOT SET")));
        assert!(output.contains(&paint(Color::Green, "  CLAUDE_CODE_SESSION: ✓ SET")));
        assert!(!output.contains("Preview:"));
    }
}
