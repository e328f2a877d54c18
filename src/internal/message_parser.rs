//! Decoding of the CLI's stream-json output into typed messages.

use serde_json::{Map, Value};

use crate::error::{AgentError, Result};
use crate::types::{
    AssistantMessage, AssistantMessageError, ContentBlock, Message, ResultMessage, SystemMessage,
    UserMessage, UserMessageContent,
};

/// Parse one JSON object printed by the CLI.
///
/// Returns `Ok(None)` for message types this crate does not model (rate
/// limit notices, partial stream events and the like) so callers can skip
/// them without failing the whole query.
///
/// # Errors
/// Returns `MessageParse` if the value is not an object, has no `type`, or a
/// known message type is missing a required field.
pub fn parse_message(data: Value) -> Result<Option<Message>> {
    let obj = match data {
        Value::Object(ref o) => o,
        _ => {
            return Err(AgentError::message_parse(
                format!(
                    "Invalid message data type (expected object, got {})",
                    value_type_name(&data)
                ),
                Some(data),
            ));
        }
    };

    let message_type = match obj.get("type").and_then(|v| v.as_str()) {
        Some(t) => t,
        None => {
            return Err(AgentError::message_parse(
                "Message missing 'type' field",
                Some(data),
            ));
        }
    };

    let message = match message_type {
        "user" => parse_user_message(obj)?,
        "assistant" => parse_assistant_message(obj)?,
        "system" => parse_system_message(obj)?,
        "result" => parse_result_message(obj)?,
        other => {
            tracing::debug!(message_type = other, "skipping unrecognized message type");
            return Ok(None);
        }
    };

    Ok(Some(message))
}

fn parse_user_message(obj: &Map<String, Value>) -> Result<Message> {
    let content_value = obj
        .get("message")
        .and_then(|m| m.get("content"))
        .ok_or_else(|| {
            AgentError::message_parse("Missing 'message.content' in user message", None)
        })?;

    let content = match content_value {
        Value::String(text) => UserMessageContent::Text(text.clone()),
        Value::Array(blocks) => UserMessageContent::Blocks(parse_content_blocks(blocks)),
        other => UserMessageContent::Text(other.to_string()),
    };

    Ok(Message::User(UserMessage { content }))
}

fn parse_assistant_message(obj: &Map<String, Value>) -> Result<Message> {
    let message = obj.get("message").ok_or_else(|| {
        AgentError::message_parse("Missing 'message' field in assistant message", None)
    })?;

    let content_value = message.get("content").ok_or_else(|| {
        AgentError::message_parse("Missing 'content' field in assistant message", None)
    })?;

    let content = content_value
        .as_array()
        .map(|blocks| parse_content_blocks(blocks))
        .unwrap_or_default();

    let model = message
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    // The CLI has put the error tag both beside and inside `message`.
    let error = obj
        .get("error")
        .or_else(|| message.get("error"))
        .and_then(|v| v.as_str())
        .map(parse_assistant_error);

    Ok(Message::Assistant(AssistantMessage {
        content,
        model,
        error,
    }))
}

fn parse_system_message(obj: &Map<String, Value>) -> Result<Message> {
    let subtype = obj
        .get("subtype")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            AgentError::message_parse("Missing 'subtype' field in system message", None)
        })?
        .to_string();

    let data = obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

    Ok(Message::System(SystemMessage { subtype, data }))
}

fn parse_result_message(obj: &Map<String, Value>) -> Result<Message> {
    let subtype = obj
        .get("subtype")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    let duration_ms = obj
        .get("duration_ms")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| {
            AgentError::message_parse("Missing 'duration_ms' field in result message", None)
        })?;

    let session_id = obj
        .get("session_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            AgentError::message_parse("Missing 'session_id' field in result message", None)
        })?
        .to_string();

    Ok(Message::Result(ResultMessage {
        subtype,
        duration_ms,
        is_error: obj
            .get("is_error")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        num_turns: obj
            .get("num_turns")
            .and_then(|v| v.as_i64())
            .map(|n| i32::try_from(n).unwrap_or(i32::MAX))
            .unwrap_or(0),
        session_id,
        total_cost_usd: obj.get("total_cost_usd").and_then(|v| v.as_f64()),
        result: obj.get("result").and_then(|v| v.as_str()).map(String::from),
    }))
}

/// Parse content blocks, dropping any this crate does not model.
fn parse_content_blocks(blocks: &[Value]) -> Vec<ContentBlock> {
    blocks
        .iter()
        .filter_map(|block| match parse_content_block(block) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::debug!(error = %err, "dropping content block");
                None
            }
        })
        .collect()
}

fn parse_content_block(block: &Value) -> Result<ContentBlock> {
    let obj = block.as_object().ok_or_else(|| {
        AgentError::message_parse("Content block is not an object", Some(block.clone()))
    })?;

    let block_type = obj.get("type").and_then(|v| v.as_str()).ok_or_else(|| {
        AgentError::message_parse("Content block missing 'type' field", Some(block.clone()))
    })?;

    let str_field = |key: &str| {
        obj.get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };

    match block_type {
        "text" => Ok(ContentBlock::Text {
            text: str_field("text"),
        }),
        "thinking" => Ok(ContentBlock::Thinking {
            thinking: str_field("thinking"),
            signature: str_field("signature"),
        }),
        "tool_use" => Ok(ContentBlock::ToolUse {
            id: str_field("id"),
            name: str_field("name"),
            input: obj.get("input").cloned().unwrap_or(Value::Null),
        }),
        _ => Err(AgentError::message_parse(
            format!("Unknown content block type: {}", block_type),
            Some(block.clone()),
        )),
    }
}

fn parse_assistant_error(error: &str) -> AssistantMessageError {
    match error {
        "authentication_failed" => AssistantMessageError::AuthenticationFailed,
        "billing_error" => AssistantMessageError::BillingError,
        "rate_limit" => AssistantMessageError::RateLimit,
        "invalid_request" => AssistantMessageError::InvalidRequest,
        "server_error" => AssistantMessageError::ServerError,
        _ => AssistantMessageError::Unknown,
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
