use anyhow::Result;
use dotenvy::dotenv;

pub mod api;
pub mod cart;
pub mod config;
pub mod interface;
pub mod logger;
pub mod transcript;
pub mod utils;

/// Run the application: load `.env`, load config, and start the chat REPL.
pub async fn run() -> Result<()> {
    // Load environment variables from .env (PIZZABOT_SERVER_URL override)
    dotenv().ok();

    let config = config::AppConfig::load();
    interface::start_repl(&config).await;

    Ok(())
}

// Re-exports for library consumers: common useful types
pub use api::{ApiClient, CartSummary, ChatEndpoint, ChatReply, Menu};
pub use cart::{CartBoard, CartPoller};
pub use config::AppConfig;
pub use transcript::{Sender, Transcript};
