//! Subprocess transport running the Claude Code CLI in print mode.

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use std::env;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout};

use crate::error::{AgentError, Result};
use crate::types::AgentOptions;

use super::Transport;

/// Minimum required Claude Code version.
const MINIMUM_CLAUDE_CODE_VERSION: &str = "2.0.0";

/// Default maximum buffer size (1MB).
const DEFAULT_MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// Runs `claude --print` for a single prompt and reads its stream-json output.
pub struct SubprocessCliTransport {
    prompt: String,
    options: AgentOptions,
    cli_path: PathBuf,
    process: Option<Child>,
    stdout: Option<BufReader<ChildStdout>>,
    ready: bool,
    max_buffer_size: usize,
}

impl SubprocessCliTransport {
    /// Create a transport for `prompt`, locating the CLI if no path is configured.
    pub fn new(prompt: impl Into<String>, options: AgentOptions) -> Result<Self> {
        let cli_path = match options.cli_path {
            Some(ref path) => path.clone(),
            None => Self::find_cli()?,
        };
        let max_buffer_size = options.max_buffer_size.unwrap_or(DEFAULT_MAX_BUFFER_SIZE);

        Ok(Self {
            prompt: prompt.into(),
            options,
            cli_path,
            process: None,
            stdout: None,
            ready: false,
            max_buffer_size,
        })
    }

    /// Find Claude Code CLI binary.
    fn find_cli() -> Result<PathBuf> {
        if let Ok(path) = which::which("claude") {
            return Ok(path);
        }

        let home = dirs::home_dir();
        let locations = [
            home.as_ref().map(|h| h.join(".npm-global/bin/claude")),
            Some(PathBuf::from("/usr/local/bin/claude")),
            home.as_ref().map(|h| h.join(".local/bin/claude")),
            home.as_ref().map(|h| h.join("node_modules/.bin/claude")),
            home.as_ref().map(|h| h.join(".yarn/bin/claude")),
            home.as_ref().map(|h| h.join(".claude/local/claude")),
        ];

        locations
            .into_iter()
            .flatten()
            .find(|location| location.is_file())
            .ok_or_else(|| AgentError::cli_not_found(None))
    }

    /// Build the CLI arguments (without the program itself).
    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
        ];

        if let Some(ref prompt) = self.options.system_prompt {
            args.extend(["--system-prompt".to_string(), prompt.clone()]);
        }

        if !self.options.allowed_tools.is_empty() {
            args.extend([
                "--allowedTools".to_string(),
                self.options.allowed_tools.join(","),
            ]);
        }

        if let Some(max_turns) = self.options.max_turns {
            args.extend(["--max-turns".to_string(), max_turns.to_string()]);
        }

        if let Some(ref model) = self.options.model {
            args.extend(["--model".to_string(), model.clone()]);
        }

        args.extend(["--print".to_string(), "--".to_string(), self.prompt.clone()]);
        args
    }

    /// Warn when the installed CLI is older than we expect. Never fails.
    async fn check_version(&self) {
        if env::var_os("CLAUDE_AGENT_SDK_SKIP_VERSION_CHECK").is_some() {
            return;
        }

        let Ok(output) = tokio::process::Command::new(&self.cli_path)
            .arg("-v")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
        else {
            return;
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(version) = stdout.split_whitespace().next() {
            if version_compare(version, MINIMUM_CLAUDE_CODE_VERSION) < 0 {
                tracing::warn!(
                    "Claude Code version {} is unsupported. Minimum required: {}",
                    version,
                    MINIMUM_CLAUDE_CODE_VERSION
                );
            }
        }
    }
}

/// Compare dotted version strings numerically.
fn version_compare(v1: &str, v2: &str) -> i32 {
    let parse_version =
        |v: &str| -> Vec<i32> { v.split('.').filter_map(|s| s.parse::<i32>().ok()).collect() };

    let v1_parts = parse_version(v1);
    let v2_parts = parse_version(v2);

    for i in 0..std::cmp::max(v1_parts.len(), v2_parts.len()) {
        let p1 = v1_parts.get(i).copied().unwrap_or(0);
        let p2 = v2_parts.get(i).copied().unwrap_or(0);
        if p1 != p2 {
            return if p1 < p2 { -1 } else { 1 };
        }
    }
    0
}

#[async_trait]
impl Transport for SubprocessCliTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.process.is_some() {
            return Ok(());
        }

        self.check_version().await;

        let mut command = tokio::process::Command::new(&self.cli_path);
        command
            .args(self.build_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .envs(&self.options.env)
            .env("CLAUDE_CODE_ENTRYPOINT", "sdk-rust")
            .kill_on_drop(true);

        if let Some(ref cwd) = self.options.cwd {
            command.current_dir(cwd);
        }

        tracing::debug!(cli = %self.cli_path.display(), "spawning Claude Code");

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AgentError::cli_not_found(Some(self.cli_path.display().to_string()))
            } else {
                AgentError::CliConnection(format!("Failed to start Claude Code: {}", e))
            }
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::CliConnection("Failed to capture stdout".to_string()))?;

        self.process = Some(child);
        self.stdout = Some(BufReader::new(stdout));
        self.ready = true;
        Ok(())
    }

    fn read_messages(&mut self) -> Pin<Box<dyn Stream<Item = Result<Value>> + Send + '_>> {
        let stdout = self.stdout.take();
        let process = self.process.take();
        let max_buffer_size = self.max_buffer_size;

        Box::pin(async_stream::try_stream! {
            let mut stdout = stdout.ok_or_else(|| {
                AgentError::CliConnection("Not connected".to_string())
            })?;

            let mut json_buffer = String::new();
            let mut line = String::new();

            loop {
                line.clear();
                let bytes_read = stdout.read_line(&mut line).await.map_err(|e| {
                    AgentError::CliConnection(format!("Failed to read from stdout: {}", e))
                })?;

                if bytes_read == 0 {
                    break;
                }

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                // A message may be split across lines, but must start with an object.
                if json_buffer.is_empty() && !trimmed.starts_with('{') {
                    Err(AgentError::message_parse(
                        format!("Unexpected non-JSON output from Claude Code: {}", trimmed),
                        None,
                    ))?;
                }
                json_buffer.push_str(trimmed);

                if json_buffer.len() > max_buffer_size {
                    let len = json_buffer.len();
                    json_buffer.clear();
                    Err(AgentError::CliConnection(format!(
                        "JSON message exceeded maximum buffer size of {} bytes (got {})",
                        max_buffer_size, len
                    )))?;
                }

                if let Ok(data) = serde_json::from_str::<Value>(&json_buffer) {
                    json_buffer.clear();
                    yield data;
                }
            }

            if let Some(mut child) = process {
                let status = child.wait().await.map_err(AgentError::from)?;
                if !status.success() {
                    Err(AgentError::process_error(
                        "Claude Code exited unsuccessfully",
                        status.code(),
                    ))?;
                }
            }

            if !json_buffer.is_empty() {
                serde_json::from_str::<Value>(&json_buffer).map_err(AgentError::from)?;
            }
        })
    }

    async fn close(&mut self) -> Result<()> {
        self.ready = false;
        self.stdout = None;

        if let Some(mut process) = self.process.take() {
            let _ = process.kill().await;
        }

        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}
