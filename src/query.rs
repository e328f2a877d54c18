//! One-shot queries against Claude Code.

use futures::{Stream, StreamExt};

use crate::error::Result;
use crate::internal::parse_message;
use crate::transport::{SubprocessCliTransport, Transport};
use crate::types::{AgentOptions, Message};

/// Send `prompt` to Claude Code and stream back the messages it produces.
///
/// The CLI is started before this function returns, so a missing binary is
/// reported here rather than on the first stream item. The stream is lazy:
/// nothing is read until it is polled, and it ends once the CLI exits.
///
/// # Example
///
/// ```no_run
/// use claude_oauth_check::{query, AgentOptions, Message};
/// use futures::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let options = AgentOptions::builder()
///         .model("claude-3-5-sonnet-20241022")
///         .build();
///
///     let stream = query("What is the capital of France?", Some(options)).await?;
///     tokio::pin!(stream);
///
///     while let Some(message) = stream.next().await {
///         if let Message::Assistant(assistant) = message? {
///             print!("{}", assistant.text());
///         }
///     }
///     Ok(())
/// }
/// ```
pub async fn query(
    prompt: impl Into<String>,
    options: Option<AgentOptions>,
) -> Result<impl Stream<Item = Result<Message>>> {
    let transport = SubprocessCliTransport::new(prompt, options.unwrap_or_default())?;
    query_with_transport(transport).await
}

/// Stream messages from an already-configured transport.
///
/// Useful for testing or for custom communication channels. Messages of
/// types this crate does not model are skipped.
pub async fn query_with_transport<T: Transport + 'static>(
    mut transport: T,
) -> Result<impl Stream<Item = Result<Message>>> {
    transport.connect().await?;

    let stream = async_stream::try_stream! {
        {
            let msg_stream = transport.read_messages();
            tokio::pin!(msg_stream);

            while let Some(result) = msg_stream.next().await {
                let data = result?;
                if let Some(message) = parse_message(data)? {
                    tracing::debug!(kind = message.kind(), "received message");
                    yield message;
                }
            }
        }

        transport.close().await?;
    };

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::pin::Pin;

    /// Transport replaying canned JSON values.
    struct MockTransport {
        messages: VecDeque<Result<Value>>,
        connected: bool,
        should_fail_connect: bool,
    }

    impl MockTransport {
        fn new(messages: Vec<Value>) -> Self {
            Self::with_results(messages.into_iter().map(Ok).collect())
        }

        fn with_results(messages: Vec<Result<Value>>) -> Self {
            Self {
                messages: messages.into(),
                connected: false,
                should_fail_connect: false,
            }
        }

        fn failing_connect() -> Self {
            Self {
                should_fail_connect: true,
                ..Self::new(vec![])
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn connect(&mut self) -> Result<()> {
            if self.should_fail_connect {
                return Err(AgentError::CliConnection(
                    "Mock connection failed".to_string(),
                ));
            }
            self.connected = true;
            Ok(())
        }

        fn read_messages(&mut self) -> Pin<Box<dyn Stream<Item = Result<Value>> + Send + '_>> {
            Box::pin(futures::stream::iter(std::mem::take(&mut self.messages)))
        }

        async fn close(&mut self) -> Result<()> {
            self.connected = false;
            Ok(())
        }

        fn is_ready(&self) -> bool {
            self.connected
        }
    }

    fn assistant(texts: &[&str]) -> Value {
        let content: Vec<Value> = texts
            .iter()
            .map(|t| json!({"type": "text", "text": t}))
            .collect();
        json!({
            "type": "assistant",
            "message": {"model": "claude-3-5-sonnet-20241022", "content": content}
        })
    }

    fn result() -> Value {
        json!({
            "type": "result",
            "subtype": "success",
            "duration_ms": 1000,
            "session_id": "test-session-123"
        })
    }

    #[tokio::test]
    async fn test_query_with_transport_streams_messages_in_order() {
        let transport = MockTransport::new(vec![
            json!({"type": "system", "subtype": "init", "session_id": "s"}),
            assistant(&["Message 1"]),
            assistant(&["Message 2"]),
            result(),
        ]);
        let stream = query_with_transport(transport).await.unwrap();
        tokio::pin!(stream);

        let mut kinds = Vec::new();
        let mut text = String::new();
        while let Some(message) = stream.next().await {
            let message = message.unwrap();
            if let Some(a) = message.as_assistant() {
                text.push_str(&a.text());
            }
            kinds.push(message.kind());
        }

        assert_eq!(kinds, ["system", "assistant", "assistant", "result"]);
        assert_eq!(text, "Message 1Message 2");
    }

    #[tokio::test]
    async fn test_query_closes_transport_after_last_message() {
        let closed = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));

        struct ClosingTransport(MockTransport, std::sync::Arc<std::sync::atomic::AtomicBool>);

        #[async_trait]
        impl Transport for ClosingTransport {
            async fn connect(&mut self) -> Result<()> {
                self.0.connect().await
            }

            fn read_messages(
                &mut self,
            ) -> Pin<Box<dyn Stream<Item = Result<Value>> + Send + '_>> {
                self.0.read_messages()
            }

            async fn close(&mut self) -> Result<()> {
                self.1.store(true, std::sync::atomic::Ordering::SeqCst);
                self.0.close().await
            }

            fn is_ready(&self) -> bool {
                self.0.is_ready()
            }
        }

        let transport = ClosingTransport(MockTransport::new(vec![result()]), closed.clone());
        let stream = query_with_transport(transport).await.unwrap();
        let messages: Vec<_> = stream.collect().await;

        assert_eq!(messages.len(), 1);
        assert!(closed.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_query_with_transport_handles_empty_stream() {
        let stream = query_with_transport(MockTransport::new(vec![]))
            .await
            .unwrap();
        let messages: Vec<_> = stream.collect().await;
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_query_with_transport_connect_failure() {
        let result = query_with_transport(MockTransport::failing_connect()).await;
        assert!(matches!(result, Err(AgentError::CliConnection(_))));
    }

    #[tokio::test]
    async fn test_query_skips_unmodelled_message_types() {
        let transport = MockTransport::new(vec![
            json!({"type": "stream_event", "uuid": "u", "session_id": "s", "event": {}}),
            assistant(&["kept"]),
        ]);
        let stream = query_with_transport(transport).await.unwrap();
        let messages: Vec<_> = stream.collect().await;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].as_ref().unwrap().is_assistant());
    }

    #[tokio::test]
    async fn test_query_surfaces_transport_error() {
        let transport = MockTransport::with_results(vec![
            Ok(assistant(&["partial"])),
            Err(AgentError::process_error("boom", Some(1))),
        ]);
        let stream = query_with_transport(transport).await.unwrap();
        let messages: Vec<_> = stream.collect().await;
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_ok());
        assert!(messages[1]
            .as_ref()
            .unwrap_err()
            .to_string()
            .contains("boom"));
    }

    #[tokio::test]
    async fn test_query_surfaces_parse_error() {
        let transport = MockTransport::new(vec![json!({"no_type": true})]);
        let stream = query_with_transport(transport).await.unwrap();
        let messages: Vec<_> = stream.collect().await;
        assert!(matches!(messages[0], Err(AgentError::MessageParse { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_query_runs_cli_subprocess() {
        use std::os::unix::fs::PermissionsExt;

        fn fake_cli(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
            let path = dir.join(name);
            let script = format!(
                "#!/bin/sh\nif [ \"$1\" = \"-v\" ]; then echo \"2.1.0 (Claude Code)\"; exit 0; fi\n{}\n",
                body
            );
            std::fs::write(&path, script).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        let dir = tempfile::tempdir().unwrap();

        // One JSON message is split across two lines.
        let ok_cli = fake_cli(
            dir.path(),
            "claude-ok",
            r#"echo '{"type":"system","subtype":"init","session_id":"s-1"}'
echo '{"type":"assistant","message":{"model":"m","content":[{"type":"text","text":"Authentication "}'
echo ',{"type":"text","text":"successful"}]}}'
echo '{"type":"result","subtype":"success","duration_ms":5,"session_id":"s-1"}'"#,
        );
        let failing_cli = fake_cli(
            dir.path(),
            "claude-fail",
            r#"echo '{"type":"system","subtype":"init","session_id":"s-2"}'
exit 3"#,
        );
        let noisy_cli = fake_cli(
            dir.path(),
            "claude-noisy",
            r#"echo 'Warning: something odd'
echo '{"type":"assistant","message":{"model":"m","content":[{"type":"text","text":"hi"}]}}'
echo '{"type":"result","subtype":"success","duration_ms":5,"session_id":"s-3"}'"#,
        );
        let truncated_cli = fake_cli(
            dir.path(),
            "claude-truncated",
            r#"echo '{"type":"system","subtype":"init","session_id":"s-4"}'
echo '{"type":"assistant","message":{"model":"m","content":['"#,
        );

        let options = AgentOptions::builder()
            .cli_path(&ok_cli)
            .model("claude-3-5-sonnet-20241022")
            .build();
        let stream = query("Hello!", Some(options)).await.unwrap();
        let messages: Vec<Message> = stream
            .map(|m| m.unwrap())
            .collect::<Vec<_>>()
            .await;
        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[1].as_assistant().unwrap().text(),
            "Authentication successful"
        );
        assert!(messages[2].is_result());

        let options = AgentOptions::builder().cli_path(&failing_cli).build();
        let stream = query("Hello!", Some(options)).await.unwrap();
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(
            items[1],
            Err(AgentError::Process {
                exit_code: Some(3),
                ..
            })
        ));

        // Stray text on stdout fails the query instead of swallowing what follows.
        let options = AgentOptions::builder().cli_path(&noisy_cli).build();
        let stream = query("Hello!", Some(options)).await.unwrap();
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(AgentError::MessageParse { .. })));

        // A message cut off at EOF is an error even when the CLI exits 0.
        let options = AgentOptions::builder().cli_path(&truncated_cli).build();
        let stream = query("Hello!", Some(options)).await.unwrap();
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(AgentError::Json(_))));
    }
}
