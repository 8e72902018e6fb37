mod common;

use async_trait::async_trait;
use boardroom::client_wrapper::{ClientError, ClientWrapper, GenerationOptions, Message};
use boardroom::generative::{GenerativeService, BLOCKED_CONTENT, EMPTY_STRUCTURED_OUTPUT};
use common::{ScriptedClient, StreamMode, SPEAKER_TEXT};
use futures_util::StreamExt;
use std::sync::{Arc, Mutex};

/// Returns a fixed reply and remembers the options of the last call.
struct FixedClient {
    reply: String,
    last_options: Mutex<Option<GenerationOptions>>,
}

impl FixedClient {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            last_options: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ClientWrapper for FixedClient {
    async fn send_message(
        &self,
        _messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Message, ClientError> {
        *self.last_options.lock().unwrap() = Some(options.clone());
        Ok(Message::assistant(self.reply.clone()))
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

#[tokio::test]
async fn test_sync_reply_is_trimmed_and_options_forwarded() {
    let client = Arc::new(FixedClient::new("  {\"a\": 1}\n"));
    let service = GenerativeService::new(client.clone());

    let reply = service.complete_sync("prompt", 0.1, true).await;
    assert_eq!(reply, "{\"a\": 1}");
    assert_eq!(
        client.last_options.lock().unwrap().clone(),
        Some(GenerationOptions::structured(0.1))
    );
}

#[tokio::test]
async fn test_blocked_content_placeholders() {
    let service = GenerativeService::new(Arc::new(FixedClient::new("")));
    assert_eq!(
        service.complete_sync("prompt", 0.5, true).await,
        EMPTY_STRUCTURED_OUTPUT
    );
    assert_eq!(service.complete_sync("prompt", 0.7, false).await, BLOCKED_CONTENT);
}

#[tokio::test]
async fn test_sync_failure_placeholders() {
    let service = GenerativeService::new(Arc::new(ScriptedClient::new().with_sync_error()));
    assert_eq!(service.complete_sync("prompt", 0.1, true).await, "{}");
    assert_eq!(
        service.complete_sync("prompt", 0.7, false).await,
        "Error: quota exceeded"
    );
}

#[tokio::test]
async fn test_stream_yields_fragments() {
    let service = GenerativeService::new(Arc::new(ScriptedClient::new()));
    let fragments: Vec<String> = service.complete_stream("prompt", 0.7).await.collect().await;
    assert!(fragments.len() > 1);
    assert_eq!(fragments.concat(), SPEAKER_TEXT);
}

#[tokio::test]
async fn test_stream_without_support_yields_one_error_fragment() {
    let service = GenerativeService::new(Arc::new(FixedClient::new("unused")));
    let fragments: Vec<String> = service.complete_stream("prompt", 0.7).await.collect().await;
    assert_eq!(
        fragments,
        vec!["\n[System Error: Streaming not supported by this client]".to_string()]
    );
}

#[tokio::test]
async fn test_stream_stops_after_first_error() {
    let service = GenerativeService::new(Arc::new(
        ScriptedClient::new().with_stream_mode(StreamMode::FailMidway),
    ));
    let fragments: Vec<String> = service.complete_stream("prompt", 0.7).await.collect().await;
    assert_eq!(
        fragments,
        vec![
            "We ".to_string(),
            "\n[System Error: connection reset]".to_string()
        ]
    );
}

#[tokio::test]
async fn test_stream_without_text_yields_blocked_fragment() {
    let service = GenerativeService::new(Arc::new(
        ScriptedClient::new().with_stream_mode(StreamMode::Blocked),
    ));
    let fragments: Vec<String> = service.complete_stream("prompt", 0.7).await.collect().await;
    assert_eq!(
        fragments,
        vec!["\n[System Error: Blocked content.]".to_string()]
    );
}
