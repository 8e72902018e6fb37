//! Read-only catalog of expert agent definitions.
//!
//! The catalog is loaded once (typically from `agents.json`) and shared as
//! `Arc<AgentCatalog>` with every component that needs it. It is never mutated after load.
//!
//! # Example
//!
//! ```rust
//! use boardroom::catalog::AgentCatalog;
//!
//! let catalog = AgentCatalog::from_json_str(r#"[
//!     {"id": "tech_lead", "role": "Tech Lead", "description": "Owns the architecture"}
//! ]"#).unwrap();
//!
//! let lead = catalog.get("tech_lead").unwrap();
//! assert_eq!(lead.style, "Expert");
//! assert!(lead.frameworks.is_empty());
//! ```

use crate::error::DiscussionError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_style() -> String {
    "Expert".to_string()
}

/// One expert persona the team selector can assign to a discussion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Unique catalog key (e.g. `"tech_lead"`).
    pub id: String,
    /// Display name used as the speaker name in a discussion.
    pub role: String,
    #[serde(default)]
    pub description: String,
    /// Voice the agent answers in; `"Expert"` when the definition omits it.
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default)]
    pub frameworks: Vec<String>,
}

impl AgentDefinition {
    pub fn new(
        id: impl Into<String>,
        role: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            description: description.into(),
            style: default_style(),
            frameworks: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_frameworks<I, S>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frameworks = frameworks.into_iter().map(Into::into).collect();
        self
    }

    /// Stand-in used when a stored role assignment points at an agent the catalog no
    /// longer contains.
    pub fn placeholder(role: impl Into<String>) -> Self {
        let role = role.into();
        Self::new(role.clone(), role, "")
    }
}

/// Ordered, immutable collection of [`AgentDefinition`]s.
#[derive(Debug, Clone, Default)]
pub struct AgentCatalog {
    agents: Vec<AgentDefinition>,
}

impl AgentCatalog {
    pub fn new(agents: Vec<AgentDefinition>) -> Self {
        Self { agents }
    }

    /// Load the catalog from a JSON array on disk.
    ///
    /// A missing file yields an empty catalog; unreadable or malformed content is a
    /// [`DiscussionError::Storage`] error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DiscussionError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(
                "AgentCatalog::load: {} not found, starting with an empty catalog",
                path.display()
            );
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&raw).map_err(|err| match err {
            DiscussionError::Storage(reason) => {
                DiscussionError::Storage(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })?;
        info!(
            "AgentCatalog::load: {} agent definitions from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DiscussionError> {
        serde_json::from_str::<Vec<AgentDefinition>>(raw)
            .map(Self::new)
            .map_err(|err| DiscussionError::Storage(format!("invalid agent catalog: {}", err)))
    }

    pub fn get(&self, id: &str) -> Option<&AgentDefinition> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentDefinition> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
