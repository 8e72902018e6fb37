// src/boardroom/mod.rs

pub mod catalog;
pub mod client_wrapper;
pub mod clients;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod generative;
pub mod goal;
pub mod orchestrator;
pub mod parsing;
pub mod phase;
pub mod prompts;
pub mod report;
#[cfg(feature = "server")]
pub mod server;
pub mod sqlite_store;
pub mod store;
pub mod stream_event;
pub mod team;
pub mod transcript;

pub use orchestrator::DiscussionOrchestrator;
