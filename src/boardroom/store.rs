//! Persistence boundary for discussions, role assignments and messages.
//!
//! The orchestrator talks to a [`DiscussionStore`] only. Two implementations ship with
//! the crate: [`InMemoryStore`] for tests and embedding, and
//! [`SqliteStore`](crate::sqlite_store::SqliteStore) for durable deployments.
//!
//! Messages are append-only and read back in insertion order; nothing is ever deleted.

use crate::error::DiscussionError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Lifecycle state of a discussion. Only `Active` is ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscussionStatus {
    Active,
}

impl DiscussionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscussionStatus::Active => "active",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(DiscussionStatus::Active),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: String,
    pub task: String,
    pub goal: String,
    pub status: DiscussionStatus,
    pub created_at: DateTime<Utc>,
}

/// Binding of one team slot to a catalog agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub discussion_id: String,
    pub role_name: String,
    pub description: String,
    pub agent_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Strictly increasing within a discussion.
    pub id: i64,
    pub discussion_id: String,
    pub sender: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Durable create/append/read operations keyed by discussion id.
#[async_trait]
pub trait DiscussionStore: Send + Sync {
    /// Persist a discussion, its role assignments and its opening message as one unit.
    async fn create_discussion(
        &self,
        discussion: &Discussion,
        roles: &[RoleAssignment],
        opening_sender: &str,
        opening_message: &str,
    ) -> Result<(), DiscussionError>;

    /// Append one message and return it with its assigned id.
    async fn append_message(
        &self,
        discussion_id: &str,
        sender: &str,
        content: &str,
    ) -> Result<StoredMessage, DiscussionError>;

    async fn get_discussion(&self, discussion_id: &str)
        -> Result<Option<Discussion>, DiscussionError>;

    /// Role assignments in creation order.
    async fn list_roles(&self, discussion_id: &str) -> Result<Vec<RoleAssignment>, DiscussionError>;

    /// All messages of a discussion in ascending id order.
    async fn list_messages(&self, discussion_id: &str)
        -> Result<Vec<StoredMessage>, DiscussionError>;
}

#[derive(Default)]
struct MemoryState {
    discussions: HashMap<String, Discussion>,
    roles: HashMap<String, Vec<RoleAssignment>>,
    messages: HashMap<String, Vec<StoredMessage>>,
    next_message_id: i64,
}

impl MemoryState {
    fn push_message(&mut self, discussion_id: &str, sender: &str, content: &str) -> StoredMessage {
        self.next_message_id += 1;
        let message = StoredMessage {
            id: self.next_message_id,
            discussion_id: discussion_id.to_string(),
            sender: sender.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        };
        self.messages
            .entry(discussion_id.to_string())
            .or_default()
            .push(message.clone());
        message
    }
}

/// Process-local store. Message ids are global across discussions, like an SQLite rowid.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DiscussionStore for InMemoryStore {
    async fn create_discussion(
        &self,
        discussion: &Discussion,
        roles: &[RoleAssignment],
        opening_sender: &str,
        opening_message: &str,
    ) -> Result<(), DiscussionError> {
        let mut state = self.state.write().await;
        if state.discussions.contains_key(&discussion.id) {
            return Err(DiscussionError::Storage(format!(
                "discussion {} already exists",
                discussion.id
            )));
        }
        state
            .discussions
            .insert(discussion.id.clone(), discussion.clone());
        state.roles.insert(discussion.id.clone(), roles.to_vec());
        state.push_message(&discussion.id, opening_sender, opening_message);
        Ok(())
    }

    async fn append_message(
        &self,
        discussion_id: &str,
        sender: &str,
        content: &str,
    ) -> Result<StoredMessage, DiscussionError> {
        let mut state = self.state.write().await;
        if !state.discussions.contains_key(discussion_id) {
            return Err(DiscussionError::UnknownDiscussion(discussion_id.to_string()));
        }
        Ok(state.push_message(discussion_id, sender, content))
    }

    async fn get_discussion(
        &self,
        discussion_id: &str,
    ) -> Result<Option<Discussion>, DiscussionError> {
        Ok(self.state.read().await.discussions.get(discussion_id).cloned())
    }

    async fn list_roles(&self, discussion_id: &str) -> Result<Vec<RoleAssignment>, DiscussionError> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .get(discussion_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_messages(
        &self,
        discussion_id: &str,
    ) -> Result<Vec<StoredMessage>, DiscussionError> {
        Ok(self
            .state
            .read()
            .await
            .messages
            .get(discussion_id)
            .cloned()
            .unwrap_or_default())
    }
}
