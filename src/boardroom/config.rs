//! Configuration for a boardroom deployment.
//!
//! [`BoardroomConfig`] is a plain struct; construct it directly, start from
//! [`Default`], or read the environment with [`BoardroomConfig::from_env`].
//!
//! # Example
//!
//! ```rust
//! use boardroom::BoardroomConfig;
//! use std::time::Duration;
//!
//! let config = BoardroomConfig::default()
//!     .with_language("English")
//!     .with_turn_pacing(Duration::ZERO);
//! assert_eq!(config.port, 5050);
//! assert_eq!(config.language, "English");
//! ```

use log::warn;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct BoardroomConfig {
    /// Generative model identifier.
    pub model: String,
    /// SQLite database file.
    pub db_path: PathBuf,
    /// JSON array of agent definitions.
    pub agents_file: PathBuf,
    /// HTTP listen port of the server binary.
    pub port: u16,
    /// Pause after every turn.
    pub turn_pacing: Duration,
    /// Language the model is asked to answer in.
    pub language: String,
}

impl Default for BoardroomConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            db_path: PathBuf::from("discussions.db"),
            agents_file: PathBuf::from("agents.json"),
            port: 5050,
            turn_pacing: Duration::from_millis(500),
            language: "Japanese".to_string(),
        }
    }
}

impl BoardroomConfig {
    /// Defaults overridden by `PORT`, `BOARDROOM_MODEL`, `BOARDROOM_DB_PATH`,
    /// `BOARDROOM_AGENTS_FILE`, `BOARDROOM_TURN_PACING_MS` and `BOARDROOM_LANGUAGE`.
    ///
    /// Unparsable numeric values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(model) = lookup("BOARDROOM_MODEL") {
            config.model = model;
        }
        if let Some(path) = lookup("BOARDROOM_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("BOARDROOM_AGENTS_FILE") {
            config.agents_file = PathBuf::from(path);
        }
        if let Some(language) = lookup("BOARDROOM_LANGUAGE") {
            config.language = language;
        }
        if let Some(raw) = lookup("PORT") {
            match raw.trim().parse() {
                Ok(port) => config.port = port,
                Err(err) => warn!("BoardroomConfig: ignoring PORT={:?}: {}", raw, err),
            }
        }
        if let Some(raw) = lookup("BOARDROOM_TURN_PACING_MS") {
            match raw.trim().parse() {
                Ok(ms) => config.turn_pacing = Duration::from_millis(ms),
                Err(err) => warn!(
                    "BoardroomConfig: ignoring BOARDROOM_TURN_PACING_MS={:?}: {}",
                    raw, err
                ),
            }
        }

        config
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_agents_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.agents_file = path.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_turn_pacing(mut self, pacing: Duration) -> Self {
        self.turn_pacing = pacing;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}
