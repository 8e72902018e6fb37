//! # Boardroom
//!
//! Boardroom runs simulated multi-expert business discussions on top of a generative text
//! service. Given a task, it assembles a five-member expert team, drafts a strategic goal,
//! and then drives a fixed ten-turn conversation in three phases:
//!
//! | Turns | Phase                             |
//! |-------|-----------------------------------|
//! | 1–3   | `DIVERGE (Ideation)`              |
//! | 4–7   | `DEEPEN (Critique & Feasibility)` |
//! | 8–10  | `CONVERGE (Planning)`             |
//!
//! Every turn a coordinator (`PM`) picks the next speaker and an instruction, the chosen
//! expert streams an answer, and both are appended to the discussion log. The run ends with
//! a synthesized strategic execution plan.
//!
//! The crate is layered as follows:
//!
//! * **Provider access**: [`ClientWrapper`] with a Gemini REST implementation in
//!   [`clients::gemini`], wrapped by the soft-failing [`generative::GenerativeService`]
//! * **Catalog**: [`AgentCatalog`] of expert personas, loaded once from JSON
//! * **Persistence**: the [`DiscussionStore`] trait with [`InMemoryStore`] and
//!   [`SqliteStore`] implementations
//! * **Orchestration**: [`DiscussionOrchestrator`] (creation + the turn loop), built from
//!   [`team::TeamSelector`], [`goal::GoalDefiner`], [`coordinator::Coordinator`] and
//!   [`report::ReportSynthesizer`]
//! * **Delivery**: [`StreamEvent`]s framed as server-sent events, plus an axum router in
//!   `server` (feature `server`) and the `boardroom-server` binary
//! * **Observability**: `log` throughout and the [`EventHandler`] trait for per-turn outcomes
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use boardroom::clients::gemini::GeminiClient;
//! use boardroom::{AgentCatalog, BoardroomConfig, DiscussionOrchestrator, SqliteStore};
//! use futures_util::StreamExt;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     boardroom::init_logger();
//!
//!     let config = BoardroomConfig::from_env();
//!     let client = Arc::new(GeminiClient::new_with_model_string(
//!         &std::env::var("GOOGLE_API_KEY")?,
//!         &config.model,
//!     ));
//!     let catalog = Arc::new(AgentCatalog::load(&config.agents_file)?);
//!     let store = Arc::new(SqliteStore::open(&config.db_path)?);
//!     let orchestrator = DiscussionOrchestrator::new(client, catalog, store, &config);
//!
//!     let created = orchestrator
//!         .create_discussion("Launch a subscription coffee box")
//!         .await?;
//!     println!("{}", created.opening_message);
//!
//!     let mut events = orchestrator.run_stream(&created.id);
//!     while let Some(event) = events.next().await {
//!         print!("{}", event.to_sse());
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// Applications embedding Boardroom can opt in to `RUST_LOG` driven diagnostics without
/// choosing a logging backend upfront.
///
/// ```rust
/// boardroom::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `boardroom` module.
pub mod boardroom;

// Re-exporting key items for easier external access.
pub use boardroom::client_wrapper;
pub use boardroom::client_wrapper::{
    ClientWrapper, GenerationOptions, Message, MessageChunk, MessageChunkStream, Role,
};
pub use boardroom::clients;
pub use boardroom::config;
pub use boardroom::config::BoardroomConfig;
pub use boardroom::error;
pub use boardroom::error::DiscussionError;
pub use boardroom::generative;

pub use boardroom::catalog;
pub use boardroom::catalog::{AgentCatalog, AgentDefinition};
pub use boardroom::sqlite_store;
pub use boardroom::sqlite_store::SqliteStore;
pub use boardroom::store;
pub use boardroom::store::{
    Discussion, DiscussionStatus, DiscussionStore, InMemoryStore, RoleAssignment, StoredMessage,
};

// Re-export the discussion pipeline
pub use boardroom::coordinator;
pub use boardroom::event;
pub use boardroom::event::{DiscussionEvent, EventHandler, TurnOutcome};
pub use boardroom::goal;
pub use boardroom::orchestrator;
pub use boardroom::orchestrator::{CreatedDiscussion, DiscussionOrchestrator};
pub use boardroom::parsing;
pub use boardroom::phase;
pub use boardroom::phase::{Phase, TURN_BUDGET};
pub use boardroom::prompts;
pub use boardroom::report;
#[cfg(feature = "server")]
pub use boardroom::server;
pub use boardroom::stream_event;
pub use boardroom::stream_event::StreamEvent;
pub use boardroom::team;
pub use boardroom::transcript;
