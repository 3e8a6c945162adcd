use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Application configuration, loaded from `pizzabot.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the pizza-bot backend.
    pub server_url: String,
    /// Which chat route variant the backend exposes: "process_message" or "chat".
    pub chat_endpoint: String,
    pub request_timeout_secs: u64,
    /// Cart refresh cadence. The web front end polled every 3000 ms.
    pub cart_poll_secs: u64,
    /// Show the "bot is typing" indicator while a send is in flight.
    pub typing_indicator: bool,
    pub max_transcript_entries: usize,
    pub log_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            chat_endpoint: "process_message".to_string(),
            request_timeout_secs: 30,
            cart_poll_secs: 3,
            typing_indicator: true,
            max_transcript_entries: 200,
            log_dir: "logs".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with the chain: `./pizzabot.toml` -> `~/pizzabot.toml` -> defaults.
    /// `PIZZABOT_SERVER_URL` (from the environment or `.env`) overrides the file value.
    pub fn load() -> Self {
        let mut config = Self::load_file().unwrap_or_default();
        if let Ok(url) = std::env::var("PIZZABOT_SERVER_URL") {
            if !url.is_empty() {
                config.server_url = url;
            }
        }
        config
    }

    fn load_file() -> Option<Self> {
        for path in Self::config_paths() {
            if let Ok(contents) = fs::read_to_string(&path) {
                match toml::from_str::<AppConfig>(&contents) {
                    Ok(cfg) => return Some(cfg),
                    Err(e) => {
                        eprintln!("Warning: failed to parse {}: {}", path.display(), e);
                    }
                }
            }
        }
        None
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("pizzabot.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join("pizzabot.toml"));
        }
        paths
    }
}
