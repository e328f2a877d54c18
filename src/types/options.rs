//! Configuration for a query.

use std::collections::HashMap;
use std::path::PathBuf;

/// Options passed to the Claude Code CLI for one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentOptions {
    /// Model identifier, e.g. `claude-3-5-sonnet-20241022`.
    pub model: Option<String>,

    pub system_prompt: Option<String>,

    /// Tools Claude may use without asking.
    pub allowed_tools: Vec<String>,

    pub max_turns: Option<u32>,

    /// Explicit path to the `claude` binary; discovered on PATH otherwise.
    pub cli_path: Option<PathBuf>,

    /// Working directory for the CLI process.
    pub cwd: Option<PathBuf>,

    /// Extra environment variables for the CLI process.
    pub env: HashMap<String, String>,

    /// Maximum size of a single JSON message read from the CLI.
    pub max_buffer_size: Option<usize>,
}

impl AgentOptions {
    /// Create a new builder.
    pub fn builder() -> AgentOptionsBuilder {
        AgentOptionsBuilder::default()
    }

    pub fn new() -> Self {
        Self::default()
    }
}

/// Builder for [`AgentOptions`].
#[derive(Debug, Clone, Default)]
pub struct AgentOptionsBuilder {
    options: AgentOptions,
}

impl AgentOptionsBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.options.model = Some(model.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.options.system_prompt = Some(prompt.into());
        self
    }

    pub fn allowed_tools(mut self, tools: Vec<String>) -> Self {
        self.options.allowed_tools = tools;
        self
    }

    pub fn max_turns(mut self, turns: u32) -> Self {
        self.options.max_turns = Some(turns);
        self
    }

    pub fn cli_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.cli_path = Some(path.into());
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.options.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.env.insert(key.into(), value.into());
        self
    }

    pub fn max_buffer_size(mut self, size: usize) -> Self {
        self.options.max_buffer_size = Some(size);
        self
    }

    pub fn build(self) -> AgentOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pattern() {
        let options = AgentOptions::builder()
            .model("claude-3-5-sonnet-20241022")
            .system_prompt("Be helpful")
            .allowed_tools(vec!["Read".to_string()])
            .max_turns(1)
            .env("FOO", "bar")
            .build();

        assert_eq!(options.model.as_deref(), Some("claude-3-5-sonnet-20241022"));
        assert_eq!(options.system_prompt.as_deref(), Some("Be helpful"));
        assert_eq!(options.allowed_tools, vec!["Read".to_string()]);
        assert_eq!(options.max_turns, Some(1));
        assert_eq!(options.env.get("FOO").map(String::as_str), Some("bar"));
    }

    #[test]
    fn test_defaults_are_empty() {
        let options = AgentOptions::new();
        assert!(options.model.is_none());
        assert!(options.allowed_tools.is_empty());
        assert!(options.cli_path.is_none());
        assert!(options.max_buffer_size.is_none());
    }
}
