use async_trait::async_trait;
use futures_util::Stream;
use std::error::Error;
use std::pin::Pin;

/// A ClientWrapper is a wrapper around a specific generative text service.
/// It provides a common interface for one-shot completions and streamed completions.
/// It does not soften failures; that is the job of
/// [`GenerativeService`](crate::generative::GenerativeService), which sits on top of it.
// src/boardroom/client_wrapper.rs

/// Represents the possible roles for a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    System,
    // a prompt built by the orchestrator
    User,
    // text produced by the model
    Assistant,
}

/// Represents a generic message to be sent to an LLM.
#[derive(Clone, Debug)]
pub struct Message {
    /// The role associated with the message.
    pub role: Role,
    /// The actual content of the message.
    pub content: String,
}

impl Message {
    /// Shorthand for a user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Shorthand for an assistant-role message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Represents a chunk of a streaming message response.
#[derive(Clone, Debug)]
pub struct MessageChunk {
    /// The incremental content in this chunk.
    pub content: String,
    /// Whether this is the final chunk in the stream.
    pub is_final: bool,
}

/// Sampling knobs forwarded with every request.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Ask the service for a JSON document instead of free text.
    pub structured_output: bool,
}

impl GenerationOptions {
    /// Free-text generation at the given temperature.
    pub fn text(temperature: f32) -> Self {
        Self {
            temperature,
            structured_output: false,
        }
    }

    /// JSON-mode generation at the given temperature.
    pub fn structured(temperature: f32) -> Self {
        Self {
            temperature,
            structured_output: true,
        }
    }
}

/// Type alias for a Send-able error box
pub type ClientError = Box<dyn Error + Send + Sync>;

/// Stream of incremental chunks returned by [`ClientWrapper::send_message_stream`].
pub type MessageChunkStream = Pin<Box<dyn Stream<Item = Result<MessageChunk, ClientError>> + Send>>;

/// Trait defining the interface to interact with generative text services.
#[async_trait]
pub trait ClientWrapper: Send + Sync {
    /// Send a message to the LLM and get a response.
    /// - `messages`: The messages to send in the request.
    /// - `options`: Temperature and output mode for this call.
    async fn send_message(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Message, ClientError>;

    /// Send a message to the LLM and get a streaming response.
    /// Returns a Stream of MessageChunk items, allowing tokens to be processed as they arrive.
    /// This method has a default implementation that returns an error, so clients
    /// without streaming support still satisfy the trait.
    async fn send_message_stream(
        &self,
        _messages: &[Message],
        _options: &GenerationOptions,
    ) -> Result<MessageChunkStream, ClientError> {
        Err("Streaming not supported by this client".into())
    }

    /// Model identifier used for logging.
    fn model_name(&self) -> &str;
}
