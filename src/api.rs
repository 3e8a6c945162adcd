use crate::config::AppConfig;
use crate::utils::find_char_boundary;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ── Chat endpoint abstraction ───────────────────────────────────────────

/// The two backend variants expose the chat route under different paths
/// (and name the reply field differently, see [`ChatReply`]). Neither is
/// authoritative, so the variant is a config choice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChatEndpoint {
    /// `POST /process_message`, replies with `{response, session_id}`.
    ProcessMessage,
    /// `POST /chat`, replies with `{reply}`.
    Chat,
}

impl ChatEndpoint {
    /// Parse the endpoint string from config.
    pub fn from_config(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "process_message" | "process-message" => Ok(Self::ProcessMessage),
            "chat" => Ok(Self::Chat),
            other => Err(anyhow!(
                "Unknown chat_endpoint '{}'. Supported: process_message, chat",
                other
            )),
        }
    }

    /// URL path for this endpoint.
    pub fn path(&self) -> &'static str {
        match self {
            Self::ProcessMessage => "/process_message",
            Self::Chat => "/chat",
        }
    }

    /// Human-readable name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ProcessMessage => "process_message",
            Self::Chat => "chat",
        }
    }
}

// ── Request / Response types ────────────────────────────────────────────

/// `GET /menu` body: both fields are pre-rendered fragments, displayed
/// as-is after terminal normalization.
#[derive(Deserialize, Clone, Debug)]
pub struct Menu {
    pub pizzas: String,
    pub customizations: String,
}

/// `GET /cart` body: display text, fully replacing the previous snapshot.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct CartSummary {
    pub items: String,
    pub total: String,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Chat reply. The `/process_message` variant names the text field
/// `response` and includes a `session_id`; the `/chat` variant names it
/// `reply` and omits the session. The alias lets one type cover both.
#[derive(Deserialize, Clone, Debug)]
pub struct ChatReply {
    #[serde(alias = "reply")]
    pub response: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

// ── Client ──────────────────────────────────────────────────────────────

/// HTTP client over the three backend endpoints.
///
/// Holds the connection handle and base URL explicitly rather than
/// re-resolving them per call. The backend tracks the ordering session via
/// a cookie, so the underlying client keeps a cookie store. Every call is
/// a single attempt: transport failures, non-2xx statuses, and malformed
/// bodies all collapse into one error path for the caller to report.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    endpoint: ChatEndpoint,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let endpoint = ChatEndpoint::from_config(&config.chat_endpoint)?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            endpoint,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> ChatEndpoint {
        self.endpoint
    }

    /// Fetch the menu fragments.
    pub async fn fetch_menu(&self) -> Result<Menu> {
        let url = format!("{}/menu", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Menu request to {} failed", url))?;
        Self::parse_json(resp, "/menu").await
    }

    /// Fetch the current cart summary.
    pub async fn fetch_cart(&self) -> Result<CartSummary> {
        let url = format!("{}/cart", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Cart request to {} failed", url))?;
        Self::parse_json(resp, "/cart").await
    }

    /// Send one chat message and return the bot's reply.
    pub async fn send_message(&self, message: &str) -> Result<ChatReply> {
        let url = format!("{}{}", self.base_url, self.endpoint.path());
        let resp = self
            .http
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await
            .with_context(|| format!("Chat request to {} failed", url))?;
        Self::parse_json(resp, self.endpoint.path()).await
    }

    /// Check the status and decode the JSON body, keeping a bounded raw
    /// preview in the error for diagnosis.
    async fn parse_json<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
        endpoint: &str,
    ) -> Result<T> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("Failed to read {} response body", endpoint))?;

        if !status.is_success() {
            return Err(anyhow!(
                "{} returned {}: {}",
                endpoint,
                status,
                &body[..find_char_boundary(&body, 200)]
            ));
        }

        serde_json::from_str(&body).with_context(|| {
            format!(
                "Failed to parse {} JSON response. Raw body:\n{}",
                endpoint,
                &body[..find_char_boundary(&body, 500)]
            )
        })
    }
}
