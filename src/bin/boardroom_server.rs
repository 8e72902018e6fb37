//! `boardroom-server`: HTTP front end for boardroom discussions.
//!
//! Reads `.env`, requires `GOOGLE_API_KEY`, and honours the `BoardroomConfig::from_env`
//! variables (`PORT`, `BOARDROOM_MODEL`, `BOARDROOM_DB_PATH`, ...).

use boardroom::clients::gemini::GeminiClient;
use boardroom::server;
use boardroom::{AgentCatalog, BoardroomConfig, DiscussionOrchestrator, SqliteStore};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    boardroom::init_logger();

    let api_key = std::env::var("GOOGLE_API_KEY")
        .map_err(|_| "API key not found. Please set GOOGLE_API_KEY in the environment or .env")?;
    let config = BoardroomConfig::from_env();

    let client = Arc::new(GeminiClient::new_with_model_string(&api_key, &config.model));
    let catalog = Arc::new(AgentCatalog::load(&config.agents_file)?);
    let store = Arc::new(SqliteStore::open(&config.db_path)?);
    let orchestrator = DiscussionOrchestrator::new(client, catalog, store, &config);

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    println!("Starting server on port {}...", config.port);
    server::serve(listener, orchestrator).await?;
    Ok(())
}
