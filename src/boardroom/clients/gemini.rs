//! Google Gemini client speaking the native `generateContent` REST API.
//!
//! # Example
//!
//! ```rust,no_run
//! use boardroom::client_wrapper::{ClientWrapper, GenerationOptions, Message};
//! use boardroom::clients::gemini::{GeminiClient, Model};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let key = std::env::var("GOOGLE_API_KEY")?;
//!     let client = GeminiClient::new_with_model_enum(&key, Model::Gemini20Flash);
//!     let reply = client
//!         .send_message(&[Message::user("Name three coffee origins.")], &GenerationOptions::text(0.7))
//!         .await?;
//!     println!("{}", reply.content);
//!     Ok(())
//! }
//! ```

use crate::client_wrapper::{
    ClientError, ClientWrapper, GenerationOptions, Message, MessageChunk, MessageChunkStream, Role,
};
use crate::clients::http_pool::get_http_client;
use async_trait::async_trait;
use futures_util::future::ready;
use futures_util::stream::{self, StreamExt};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    pub model: String,
}

pub enum Model {
    Gemini20Flash,
    Gemini20FlashLite001,
    Gemini15Pro,
    Gemini15Flash,
    Gemini25Flash,
    Gemini25Pro,
}

pub fn model_to_string(model: Model) -> String {
    match model {
        Model::Gemini20Flash => "gemini-2.0-flash".to_string(),
        Model::Gemini20FlashLite001 => "gemini-2.0-flash-lite-001".to_string(),
        Model::Gemini15Pro => "gemini-1.5-pro".to_string(),
        Model::Gemini15Flash => "gemini-1.5-flash".to_string(),
        Model::Gemini25Flash => "gemini-2.5-flash".to_string(),
        Model::Gemini25Pro => "gemini-2.5-pro".to_string(),
    }
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

// relaxed thresholds; a blocked candidate comes back as empty text
static SAFETY_SETTINGS: [SafetySetting; 4] = [
    SafetySetting {
        category: "HARM_CATEGORY_HARASSMENT",
        threshold: "BLOCK_NONE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_HATE_SPEECH",
        threshold: "BLOCK_NONE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        threshold: "BLOCK_NONE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_DANGEROUS_CONTENT",
        threshold: "BLOCK_NONE",
    },
];

#[derive(Serialize, Deserialize, Debug, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
    safety_settings: &'a [SafetySetting],
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
    #[serde(default)]
    total_token_count: usize,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate. Empty when the prompt or the answer was blocked.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Why the prompt or the answer was withheld, if it was.
    ///
    /// A candidate that stopped for anything other than `STOP` or `MAX_TOKENS` without
    /// producing text counts as blocked.
    fn block_reason(&self) -> Option<String> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.clone())
        {
            return Some(reason);
        }
        let candidate = self.candidates.first()?;
        match candidate.finish_reason.as_deref() {
            Some("STOP") | Some("MAX_TOKENS") | None => None,
            Some(reason) if self.text().is_empty() => Some(reason.to_string()),
            Some(_) => None,
        }
    }

    fn is_final(&self) -> bool {
        self.candidates
            .first()
            .map(|candidate| candidate.finish_reason.is_some())
            .unwrap_or(false)
    }
}

impl GeminiClient {
    pub fn new_with_model_string(secret_key: &str, model_name: &str) -> Self {
        Self::new_with_base_url(secret_key, model_name, DEFAULT_BASE_URL)
    }

    pub fn new_with_model_enum(secret_key: &str, model: Model) -> Self {
        Self::new_with_model_string(secret_key, &model_to_string(model))
    }

    /// This function is used to create a GeminiClient with a custom base URL
    /// The default base URL is "<https://generativelanguage.googleapis.com/v1beta/>"
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        GeminiClient {
            http: get_http_client(&base_url),
            api_key: secret_key.to_string(),
            base_url,
            model: model_name.to_string(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}models/{}:{}", self.base_url, self.model, method)
    }

    fn build_request(
        messages: &[Message],
        options: &GenerationOptions,
    ) -> GenerateContentRequest<'static> {
        let mut system_parts = Vec::new();
        let mut contents = Vec::with_capacity(messages.len());
        for msg in messages {
            let part = Part {
                text: Some(msg.content.clone()),
            };
            match msg.role {
                Role::System => system_parts.push(part),
                Role::User => contents.push(Content {
                    role: Some("user".to_owned()),
                    parts: vec![part],
                }),
                Role::Assistant => contents.push(Content {
                    role: Some("model".to_owned()),
                    parts: vec![part],
                }),
            }
        }

        GenerateContentRequest {
            contents,
            system_instruction: if system_parts.is_empty() {
                None
            } else {
                Some(Content {
                    role: None,
                    parts: system_parts,
                })
            },
            generation_config: GenerationConfig {
                temperature: options.temperature,
                response_mime_type: options.structured_output.then_some("application/json"),
            },
            safety_settings: &SAFETY_SETTINGS,
        }
    }

    async fn post(
        &self,
        method: &str,
        sse: bool,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self
            .http
            .post(self.endpoint(method))
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_request(messages, options));
        if sse {
            request = request.query(&[("alt", "sse")]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Gemini API error {}: {}", status, body).into());
        }
        Ok(response)
    }
}

/// Pull every complete `data:` line out of `buffer`, leaving any partial line behind.
///
/// Works on raw bytes so a multi-byte character split across two network reads is only
/// decoded once both halves have arrived. A blocked prompt or answer becomes an `Err` item.
fn drain_sse_lines(buffer: &mut Vec<u8>) -> Vec<Result<MessageChunk, ClientError>> {
    let mut chunks = Vec::new();
    while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
        let raw: Vec<u8> = buffer.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&raw);
        let Some(payload) = line.trim_end().strip_prefix("data:") else {
            continue;
        };
        match serde_json::from_str::<GenerateContentResponse>(payload.trim()) {
            Ok(response) => {
                if let Some(reason) = response.block_reason() {
                    warn!("GeminiClient: stream blocked ({})", reason);
                    chunks.push(Err(format!("Blocked content ({})", reason).into()));
                    continue;
                }
                let is_final = response.is_final();
                let content = response.text();
                if !content.is_empty() || is_final {
                    chunks.push(Ok(MessageChunk { content, is_final }));
                }
            }
            Err(err) => warn!("GeminiClient: skipping undecodable stream event: {}", err),
        }
    }
    chunks
}

#[async_trait]
impl ClientWrapper for GeminiClient {
    async fn send_message(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Message, ClientError> {
        let result = async {
            let response = self.post("generateContent", false, messages, options).await?;
            let body: GenerateContentResponse = response.json().await?;
            Ok::<_, ClientError>(body)
        }
        .await;

        match result {
            Ok(body) => {
                if let Some(usage) = &body.usage_metadata {
                    debug!(
                        "GeminiClient usage: input={} output={} total={}",
                        usage.prompt_token_count,
                        usage.candidates_token_count,
                        usage.total_token_count
                    );
                }
                Ok(Message::assistant(body.text()))
            }
            Err(err) => {
                if log::log_enabled!(log::Level::Error) {
                    error!("GeminiClient::send_message error: {}", err);
                }
                Err(err)
            }
        }
    }

    async fn send_message_stream(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<MessageChunkStream, ClientError> {
        let response = self
            .post("streamGenerateContent", true, messages, options)
            .await
            .map_err(|err| {
                error!("GeminiClient::send_message_stream error: {}", err);
                err
            })?;

        let chunks = response
            .bytes_stream()
            .scan(Vec::new(), |buffer, item| {
                let decoded = match item {
                    Ok(bytes) => {
                        buffer.extend_from_slice(&bytes);
                        Ok(drain_sse_lines(buffer))
                    }
                    Err(err) => Err(err),
                };
                ready(Some(decoded))
            })
            .flat_map(|decoded| match decoded {
                Ok(chunks) => stream::iter(chunks).left_stream(),
                Err(err) => stream::once(ready(Err::<MessageChunk, ClientError>(Box::new(err))))
                    .right_stream(),
            });

        Ok(Box::pin(chunks))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
