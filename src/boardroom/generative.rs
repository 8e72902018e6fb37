//! Soft-failing front door to the generative text service.
//!
//! Every component of a discussion talks to the model through [`GenerativeService`]
//! instead of a raw [`ClientWrapper`]. The service never returns an error: a failed or
//! blocked synchronous call becomes [`EMPTY_STRUCTURED_OUTPUT`] (JSON mode) or an
//! `"Error: ..."` sentence (text mode), and a failed stream yields one
//! `"[System Error: ...]"` fragment and ends. A stream that ends without any text was
//! blocked and yields `"[System Error: Blocked content.]"`. Callers that parse structured output
//! therefore always land on their deterministic fallback instead of aborting.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use boardroom::clients::gemini::{GeminiClient, Model};
//! use boardroom::generative::GenerativeService;
//!
//! # async fn demo() {
//! let client = Arc::new(GeminiClient::new_with_model_enum("key", Model::Gemini20Flash));
//! let service = GenerativeService::new(client);
//! let text = service.complete_sync("Say hi", 0.7, false).await;
//! println!("{}", text);
//! # }
//! ```

use crate::client_wrapper::{ClientWrapper, GenerationOptions, Message};
use crate::error::DiscussionError;
use futures_util::future::ready;
use futures_util::stream::{self, Stream, StreamExt};
use log::{error, warn};
use std::fmt::Display;
use std::pin::Pin;
use std::sync::Arc;

/// Placeholder returned by structured calls that failed or were blocked.
pub const EMPTY_STRUCTURED_OUTPUT: &str = "{}";

/// Placeholder returned by free-text calls whose content was blocked.
pub const BLOCKED_CONTENT: &str = "Error: Blocked content.";

/// Finite, non-restartable sequence of text fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Wraps a [`ClientWrapper`] and converts every failure into a placeholder value.
#[derive(Clone)]
pub struct GenerativeService {
    client: Arc<dyn ClientWrapper>,
}

impl GenerativeService {
    pub fn new(client: Arc<dyn ClientWrapper>) -> Self {
        Self { client }
    }

    /// The wrapped client's model identifier.
    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// One-shot completion. Never fails; see the module docs for the substitutions.
    pub async fn complete_sync(&self, prompt: &str, temperature: f32, structured: bool) -> String {
        let options = if structured {
            GenerationOptions::structured(temperature)
        } else {
            GenerationOptions::text(temperature)
        };

        match self
            .client
            .send_message(&[Message::user(prompt)], &options)
            .await
        {
            Ok(reply) if reply.content.trim().is_empty() => {
                if structured {
                    EMPTY_STRUCTURED_OUTPUT.to_string()
                } else {
                    BLOCKED_CONTENT.to_string()
                }
            }
            Ok(reply) => reply.content.trim().to_string(),
            Err(err) => {
                error!(
                    "GenerativeService::complete_sync ({}): {}",
                    self.client.model_name(),
                    DiscussionError::GenerativeServiceFailure(err.to_string())
                );
                if structured {
                    EMPTY_STRUCTURED_OUTPUT.to_string()
                } else {
                    format!("Error: {}", err)
                }
            }
        }
    }

    /// Streamed completion. Empty fragments are dropped; the first failure, or an end of
    /// stream before any text, ends the stream with a single error-description fragment.
    pub async fn complete_stream(&self, prompt: &str, temperature: f32) -> FragmentStream {
        let opened = self
            .client
            .send_message_stream(&[Message::user(prompt)], &GenerationOptions::text(temperature))
            .await;

        let chunks = match opened {
            Ok(chunks) => chunks,
            Err(err) => {
                error!(
                    "GenerativeService::complete_stream ({}): {}",
                    self.client.model_name(),
                    DiscussionError::GenerativeServiceFailure(err.to_string())
                );
                return Box::pin(stream::once(ready(error_fragment(&err))));
            }
        };

        let model = self.client.model_name().to_string();
        let fragments = stream::unfold(
            Some((chunks, false)),
            move |state| {
                let model = model.clone();
                async move {
                    let Some((mut chunks, produced)) = state else {
                        return None;
                    };
                    loop {
                        match chunks.next().await {
                            Some(Ok(chunk)) if chunk.content.is_empty() => continue,
                            Some(Ok(chunk)) => return Some((chunk.content, Some((chunks, true)))),
                            Some(Err(err)) => {
                                error!(
                                    "GenerativeService::complete_stream ({}): {}",
                                    model,
                                    DiscussionError::GenerativeServiceFailure(err.to_string())
                                );
                                return Some((error_fragment(&err), None));
                            }
                            None if produced => return None,
                            None => {
                                warn!(
                                    "GenerativeService::complete_stream ({}): stream ended without text",
                                    model
                                );
                                return Some((error_fragment(&BLOCKED_STREAM), None));
                            }
                        }
                    }
                }
            },
        );

        Box::pin(fragments)
    }
}

const BLOCKED_STREAM: &str = "Blocked content.";

fn error_fragment(err: &dyn Display) -> String {
    format!("\n[System Error: {}]", err)
}
