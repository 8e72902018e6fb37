#![allow(dead_code)]

use async_trait::async_trait;
use boardroom::client_wrapper::{
    ClientError, ClientWrapper, GenerationOptions, Message, MessageChunk, MessageChunkStream,
};
use boardroom::event::{DiscussionEvent, EventHandler};
use boardroom::{AgentCatalog, AgentDefinition, BoardroomConfig, StreamEvent};
use futures_util::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEFAULT_IDS: [&str; 5] = [
    "strategy_consultant",
    "financial_controller",
    "tech_lead",
    "marketing_strategist",
    "risk_manager",
];

pub const GOAL_TEXT: &str = "## Vision\nBest coffee box in Japan";
pub const SPEAKER_TEXT: &str = "We should start with a pilot in Tokyo";
pub const REPORT_TEXT: &str = "# Executive Summary\nShip it.";

/// How the scripted speaker stream behaves.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Word-by-word fragments of [`SPEAKER_TEXT`].
    Words,
    /// The stream cannot be opened.
    FailOpen,
    /// One fragment, then a transport error.
    FailMidway,
    /// One fragment, then nothing ever again.
    Hang,
    /// Only an empty final chunk, as a safety-blocked answer arrives.
    Blocked,
}

/// Mock provider that answers based on which prompt it receives.
pub struct ScriptedClient {
    pub team_reply: String,
    pub goal_reply: String,
    pub report_reply: String,
    coordinator_replies: Mutex<VecDeque<String>>,
    /// Used once the scripted coordinator replies run out. `None` names the first
    /// expert listed in the prompt.
    pub coordinator_default: Option<String>,
    pub stream_mode: StreamMode,
    pub sync_error: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            team_reply: serde_json::to_string(&DEFAULT_IDS).unwrap(),
            goal_reply: GOAL_TEXT.to_string(),
            report_reply: REPORT_TEXT.to_string(),
            coordinator_replies: Mutex::new(VecDeque::new()),
            coordinator_default: None,
            stream_mode: StreamMode::Words,
            sync_error: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_team_reply(mut self, reply: &str) -> Self {
        self.team_reply = reply.to_string();
        self
    }

    pub fn with_coordinator_replies<I: IntoIterator<Item = String>>(self, replies: I) -> Self {
        self.coordinator_replies.lock().unwrap().extend(replies);
        self
    }

    pub fn with_coordinator_default(mut self, reply: &str) -> Self {
        self.coordinator_default = Some(reply.to_string());
        self
    }

    pub fn with_stream_mode(mut self, mode: StreamMode) -> Self {
        self.stream_mode = mode;
        self
    }

    pub fn with_sync_error(mut self) -> Self {
        self.sync_error = true;
        self
    }

    pub fn prompts_containing(&self, needle: &str) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .cloned()
            .collect()
    }

    fn coordinator_reply(&self, prompt: &str) -> String {
        if let Some(reply) = self.coordinator_replies.lock().unwrap().pop_front() {
            return reply;
        }
        if let Some(reply) = &self.coordinator_default {
            return reply.clone();
        }
        let experts = available_experts(prompt);
        serde_json::json!({
            "next_speaker": experts.first().cloned().unwrap_or_default(),
            "instruction": "具体的な施策は？",
        })
        .to_string()
    }
}

/// Role names listed on the `Available Experts:` line of a coordinator prompt.
pub fn available_experts(prompt: &str) -> Vec<String> {
    prompt
        .lines()
        .find_map(|line| line.strip_prefix("Available Experts: "))
        .and_then(|list| serde_json::from_str(list).ok())
        .unwrap_or_default()
}

#[async_trait]
impl ClientWrapper for ScriptedClient {
    async fn send_message(
        &self,
        messages: &[Message],
        _options: &GenerationOptions,
    ) -> Result<Message, ClientError> {
        let prompt = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt.clone());

        if self.sync_error {
            return Err("quota exceeded".into());
        }

        let reply = if prompt.contains("Available Experts") {
            self.coordinator_reply(&prompt)
        } else if prompt.contains("Select exactly 5") {
            self.team_reply.clone()
        } else if prompt.contains("Strategic Execution Plan") {
            self.report_reply.clone()
        } else if prompt.contains("Strategic Business Goal") {
            self.goal_reply.clone()
        } else {
            String::new()
        };
        Ok(Message::assistant(reply))
    }

    async fn send_message_stream(
        &self,
        messages: &[Message],
        _options: &GenerationOptions,
    ) -> Result<MessageChunkStream, ClientError> {
        let prompt = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);

        let first = MessageChunk {
            content: "We ".to_string(),
            is_final: false,
        };
        match self.stream_mode {
            StreamMode::Words => {
                let words: Vec<String> = SPEAKER_TEXT
                    .split_inclusive(' ')
                    .map(str::to_string)
                    .collect();
                let last = words.len() - 1;
                let chunks = words
                    .into_iter()
                    .enumerate()
                    .map(move |(i, content)| {
                        Ok::<MessageChunk, ClientError>(MessageChunk {
                            content,
                            is_final: i == last,
                        })
                    });
                Ok(Box::pin(stream::iter(chunks)))
            }
            StreamMode::FailOpen => Err("stream refused".into()),
            StreamMode::FailMidway => {
                let items: Vec<Result<MessageChunk, ClientError>> =
                    vec![Ok(first), Err("connection reset".into())];
                Ok(Box::pin(stream::iter(items)))
            }
            StreamMode::Hang => {
                let items: Vec<Result<MessageChunk, ClientError>> = vec![Ok(first)];
                Ok(Box::pin(stream::iter(items).chain(stream::pending())))
            }
            StreamMode::Blocked => {
                let items: Vec<Result<MessageChunk, ClientError>> = vec![Ok(MessageChunk {
                    content: String::new(),
                    is_final: true,
                })];
                Ok(Box::pin(stream::iter(items)))
            }
        }
    }

    fn model_name(&self) -> &str {
        "scripted-mock"
    }
}

/// The five default agents plus `extra` filler agents.
pub fn catalog_with_defaults(extra: usize) -> AgentCatalog {
    let mut agents: Vec<AgentDefinition> = DEFAULT_IDS
        .iter()
        .map(|id| {
            AgentDefinition::new(*id, role_name(id), format!("Default expert {}", id))
                .with_style("Concise")
                .with_frameworks(["SWOT", "OKR"])
        })
        .collect();
    for i in 0..extra {
        agents.push(AgentDefinition::new(
            format!("extra_{}", i),
            format!("Extra Expert {}", i),
            "An additional specialist with a rather long description that goes past fifty characters",
        ));
    }
    AgentCatalog::new(agents)
}

pub fn role_name(id: &str) -> String {
    id.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn test_config() -> BoardroomConfig {
    BoardroomConfig::default().with_turn_pacing(Duration::ZERO)
}

/// Records every observability event.
#[derive(Default)]
pub struct RecordingHandler {
    pub events: Mutex<Vec<DiscussionEvent>>,
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn on_discussion_event(&self, event: &DiscussionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub async fn collect(stream: impl futures_util::Stream<Item = StreamEvent>) -> Vec<StreamEvent> {
    stream.collect().await
}

pub fn client(client: ScriptedClient) -> Arc<ScriptedClient> {
    Arc::new(client)
}
