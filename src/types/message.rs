//! Messages yielded by a query.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::content::ContentBlock;

/// Error category the CLI attaches to a failed assistant turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantMessageError {
    AuthenticationFailed,
    BillingError,
    RateLimit,
    InvalidRequest,
    ServerError,
    Unknown,
}

/// User message content - either a plain string or content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserMessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A user turn echoed back by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    pub content: UserMessageContent,
}

impl UserMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            content: UserMessageContent::Text(text.into()),
        }
    }
}

/// Assistant message with its ordered content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub content: Vec<ContentBlock>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AssistantMessageError>,
}

impl AssistantMessage {
    pub fn new(content: Vec<ContentBlock>, model: impl Into<String>) -> Self {
        Self {
            content,
            model: model.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: AssistantMessageError) -> Self {
        self.error = Some(error);
        self
    }

    /// Iterate the text payloads in block order, skipping other blocks.
    pub fn text_blocks(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(ContentBlock::as_text)
    }

    /// Get all text content from this message.
    pub fn text(&self) -> String {
        self.text_blocks().collect()
    }
}

/// System message with metadata (`init` and friends).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMessage {
    pub subtype: String,
    pub data: HashMap<String, Value>,
}

impl SystemMessage {
    pub fn new(subtype: impl Into<String>) -> Self {
        Self {
            subtype: subtype.into(),
            data: HashMap::new(),
        }
    }
}

/// Final message of a query with timing and cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMessage {
    pub subtype: String,
    pub duration_ms: i64,
    pub is_error: bool,
    pub num_turns: i32,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl ResultMessage {
    pub fn new(subtype: impl Into<String>, duration_ms: i64, session_id: impl Into<String>) -> Self {
        Self {
            subtype: subtype.into(),
            duration_ms,
            is_error: false,
            num_turns: 1,
            session_id: session_id.into(),
            total_cost_usd: None,
            result: None,
        }
    }
}

/// A single item of the query stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    User(UserMessage),
    Assistant(AssistantMessage),
    System(SystemMessage),
    Result(ResultMessage),
}

impl Message {
    pub fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant(_))
    }

    pub fn is_result(&self) -> bool {
        matches!(self, Self::Result(_))
    }

    /// Get as assistant message if applicable.
    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Self::Assistant(msg) => Some(msg),
            _ => None,
        }
    }

    /// Short tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Assistant(_) => "assistant",
            Self::System(_) => "system",
            Self::Result(_) => "result",
        }
    }
}

impl From<UserMessage> for Message {
    fn from(msg: UserMessage) -> Self {
        Self::User(msg)
    }
}

impl From<AssistantMessage> for Message {
    fn from(msg: AssistantMessage) -> Self {
        Self::Assistant(msg)
    }
}

impl From<SystemMessage> for Message {
    fn from(msg: SystemMessage) -> Self {
        Self::System(msg)
    }
}

impl From<ResultMessage> for Message {
    fn from(msg: ResultMessage) -> Self {
        Self::Result(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assistant_text_skips_non_text_blocks() {
        let msg = AssistantMessage::new(
            vec![
                ContentBlock::text("Hello "),
                ContentBlock::tool_use("t1", "Bash", json!({})),
                ContentBlock::text("World!"),
            ],
            "claude-3-5-sonnet",
        );
        assert_eq!(msg.text(), "Hello World!");
        assert_eq!(msg.text_blocks().collect::<Vec<_>>(), ["Hello ", "World!"]);
    }

    #[test]
    fn test_message_kinds() {
        let user: Message = UserMessage::new("hi").into();
        let assistant: Message = AssistantMessage::new(vec![], "model").into();
        let system: Message = SystemMessage::new("init").into();
        let result: Message = ResultMessage::new("success", 10, "s-1").into();

        assert_eq!(user.kind(), "user");
        assert!(assistant.is_assistant());
        assert!(assistant.as_assistant().is_some());
        assert!(system.as_assistant().is_none());
        assert!(result.is_result());
    }
}
