//! SQLite-backed [`DiscussionStore`].
//!
//! Three tables: `discussions`, `roles` and `messages` (the latter keyed by an
//! `INTEGER PRIMARY KEY`, so ids grow monotonically). Timestamps are RFC 3339 text.
//! The blocking `rusqlite` calls run on tokio's blocking pool behind one shared
//! connection.
//!
//! # Example
//!
//! ```rust,no_run
//! use boardroom::sqlite_store::SqliteStore;
//!
//! let store = SqliteStore::open("discussions.db").unwrap();
//! ```

use crate::error::DiscussionError;
use crate::store::{Discussion, DiscussionStatus, DiscussionStore, RoleAssignment, StoredMessage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS discussions (
    id TEXT PRIMARY KEY,
    task TEXT NOT NULL,
    goal TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY,
    discussion_id TEXT NOT NULL,
    sender TEXT NOT NULL,
    content TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    FOREIGN KEY(discussion_id) REFERENCES discussions(id)
);
CREATE TABLE IF NOT EXISTS roles (
    discussion_id TEXT NOT NULL,
    role_name TEXT NOT NULL,
    description TEXT NOT NULL,
    agent_id TEXT NOT NULL,
    FOREIGN KEY(discussion_id) REFERENCES discussions(id)
);
CREATE INDEX IF NOT EXISTS idx_messages_discussion ON messages(discussion_id, id);
";

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DiscussionError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, DiscussionError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, DiscussionError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T, DiscussionError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, DiscussionError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| DiscussionError::Storage("sqlite connection poisoned".to_string()))?;
            op(&mut guard)
        })
        .await
        .map_err(|err| DiscussionError::Storage(format!("sqlite task failed: {}", err)))?
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DiscussionError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| DiscussionError::Storage(format!("bad timestamp {:?}: {}", raw, err)))
}

fn insert_message(
    conn: &Connection,
    discussion_id: &str,
    sender: &str,
    content: &str,
) -> Result<StoredMessage, DiscussionError> {
    let timestamp = Utc::now();
    conn.execute(
        "INSERT INTO messages (discussion_id, sender, content, timestamp) VALUES (?1, ?2, ?3, ?4)",
        params![discussion_id, sender, content, timestamp.to_rfc3339()],
    )?;
    Ok(StoredMessage {
        id: conn.last_insert_rowid(),
        discussion_id: discussion_id.to_string(),
        sender: sender.to_string(),
        content: content.to_string(),
        timestamp,
    })
}

#[async_trait]
impl DiscussionStore for SqliteStore {
    async fn create_discussion(
        &self,
        discussion: &Discussion,
        roles: &[RoleAssignment],
        opening_sender: &str,
        opening_message: &str,
    ) -> Result<(), DiscussionError> {
        let discussion = discussion.clone();
        let roles = roles.to_vec();
        let opening_sender = opening_sender.to_string();
        let opening_message = opening_message.to_string();

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO discussions (id, task, goal, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    discussion.id,
                    discussion.task,
                    discussion.goal,
                    discussion.status.as_str(),
                    discussion.created_at.to_rfc3339()
                ],
            )?;
            for role in &roles {
                tx.execute(
                    "INSERT INTO roles (discussion_id, role_name, description, agent_id) VALUES (?1, ?2, ?3, ?4)",
                    params![discussion.id, role.role_name, role.description, role.agent_id],
                )?;
            }
            insert_message(&tx, &discussion.id, &opening_sender, &opening_message)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn append_message(
        &self,
        discussion_id: &str,
        sender: &str,
        content: &str,
    ) -> Result<StoredMessage, DiscussionError> {
        let discussion_id = discussion_id.to_string();
        let sender = sender.to_string();
        let content = content.to_string();

        self.with_conn(move |conn| {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM discussions WHERE id = ?1",
                    params![discussion_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !exists {
                return Err(DiscussionError::UnknownDiscussion(discussion_id));
            }
            insert_message(conn, &discussion_id, &sender, &content)
        })
        .await
    }

    async fn get_discussion(
        &self,
        discussion_id: &str,
    ) -> Result<Option<Discussion>, DiscussionError> {
        let discussion_id = discussion_id.to_string();

        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, task, goal, status, created_at FROM discussions WHERE id = ?1",
                    params![discussion_id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, String>(4)?,
                        ))
                    },
                )
                .optional()?;

            let Some((id, task, goal, status, created_at)) = row else {
                return Ok(None);
            };
            let status = DiscussionStatus::parse(&status).ok_or_else(|| {
                DiscussionError::Storage(format!("unknown discussion status {:?}", status))
            })?;
            Ok(Some(Discussion {
                id,
                task,
                goal,
                status,
                created_at: parse_timestamp(&created_at)?,
            }))
        })
        .await
    }

    async fn list_roles(&self, discussion_id: &str) -> Result<Vec<RoleAssignment>, DiscussionError> {
        let discussion_id = discussion_id.to_string();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT discussion_id, role_name, description, agent_id FROM roles \
                 WHERE discussion_id = ?1 ORDER BY rowid ASC",
            )?;
            let rows = stmt.query_map(params![discussion_id], |row| {
                Ok(RoleAssignment {
                    discussion_id: row.get(0)?,
                    role_name: row.get(1)?,
                    description: row.get(2)?,
                    agent_id: row.get(3)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
        .await
    }

    async fn list_messages(
        &self,
        discussion_id: &str,
    ) -> Result<Vec<StoredMessage>, DiscussionError> {
        let discussion_id = discussion_id.to_string();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, discussion_id, sender, content, timestamp FROM messages \
                 WHERE discussion_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![discussion_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?;

            let mut messages = Vec::new();
            for row in rows {
                let (id, discussion_id, sender, content, timestamp) = row?;
                messages.push(StoredMessage {
                    id,
                    discussion_id,
                    sender,
                    content,
                    timestamp: parse_timestamp(&timestamp)?,
                });
            }
            Ok(messages)
        })
        .await
    }
}
