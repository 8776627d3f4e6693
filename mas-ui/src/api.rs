use std::collections::BTreeMap;
use std::sync::OnceLock;

use gloo_net::http::Request;
use mas_client::config::{
    ENV_API_URL, ENV_KEEPALIVE_SECS, ENV_RECONNECT_DELAY_MS, ENV_WS_URL, DEFAULT_API_BASE,
};
use mas_client::ClientConfig;
use serde::de::DeserializeOwned;
use shared_types::{
    Acknowledgement, AgentCatalog, AgentStats, ChatMessage, ChatRequest, ChatResponse,
    CreatedSession, SessionRecord, StoredMessage,
};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

// ============================================================================
// Configuration
// ============================================================================

fn baked_env(key: &str) -> Option<String> {
    let value = match key {
        ENV_API_URL => option_env!("MAS_API_URL"),
        ENV_WS_URL => option_env!("MAS_WS_URL"),
        ENV_RECONNECT_DELAY_MS => option_env!("MAS_RECONNECT_DELAY_MS"),
        ENV_KEEPALIVE_SECS => option_env!("MAS_KEEPALIVE_SECS"),
        _ => None,
    };
    value.map(str::to_string)
}

/// API base when none was baked in at build time
/// - In development (localhost): the backend's default port
/// - Otherwise: same origin (the backend serves the app)
fn origin_api_base() -> String {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return DEFAULT_API_BASE.to_string();
    };
    let hostname = location.hostname().unwrap_or_default();
    if hostname.is_empty() || hostname == "localhost" || hostname == "127.0.0.1" {
        return DEFAULT_API_BASE.to_string();
    }
    location
        .origin()
        .unwrap_or_else(|_| DEFAULT_API_BASE.to_string())
}

fn build_client_config() -> ClientConfig {
    let lookup = |key: &str| {
        baked_env(key).or_else(|| (key == ENV_API_URL).then(origin_api_base))
    };
    ClientConfig::from_lookup(lookup).unwrap_or_else(|e| {
        tracing::warn!("Invalid build-time configuration ({}); using defaults", e);
        ClientConfig::with_api_base(&origin_api_base())
    })
}

static CLIENT_CONFIG: OnceLock<ClientConfig> = OnceLock::new();

pub fn client_config() -> &'static ClientConfig {
    CLIENT_CONFIG.get_or_init(build_client_config)
}

fn api_url(path: &str) -> String {
    client_config().api_url(path)
}

// ============================================================================
// Helpers
// ============================================================================

async fn describe_http_error(response: gloo_net::http::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if body.trim().is_empty() {
        return format!("HTTP error: {status}");
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
        for field in ["detail", "error", "message"] {
            if let Some(text) = json.get(field).and_then(|v| v.as_str()) {
                return format!("HTTP error: {status} ({text})");
            }
        }
    }

    format!("HTTP error: {status} ({body})")
}

async fn read_json<T: DeserializeOwned>(response: gloo_net::http::Response) -> Result<T, String> {
    if !response.ok() {
        return Err(describe_http_error(response).await);
    }
    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse JSON: {e}"))
}

async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;
    read_json(response).await
}

// ============================================================================
// Chat
// ============================================================================

/// Synchronous request/response path; the socket is the primary channel.
pub async fn send_chat_message(message: &str, session_id: &str) -> Result<ChatResponse, String> {
    let body = ChatRequest {
        message: message.to_string(),
        session_id: Some(session_id.to_string()),
    };
    let response = Request::post(&api_url("/api/chat/send"))
        .json(&body)
        .map_err(|e| format!("Failed to serialize request: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;
    read_json(response).await
}

pub async fn fetch_chat_history(session_id: &str, limit: usize) -> Result<Vec<ChatMessage>, String> {
    let url = api_url(&format!("/api/chat/history/{session_id}?limit={limit}"));
    let stored: Vec<StoredMessage> = get_json(&url).await?;
    Ok(stored.into_iter().map(ChatMessage::from).collect())
}

pub async fn clear_chat_history(session_id: &str) -> Result<Acknowledgement, String> {
    let response = Request::delete(&api_url(&format!("/api/chat/history/{session_id}")))
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;
    read_json(response).await
}

// ============================================================================
// Agents
// ============================================================================

pub async fn fetch_agent_info() -> Result<AgentCatalog, String> {
    get_json(&api_url("/api/agents/info")).await
}

pub async fn fetch_agent_metrics() -> Result<BTreeMap<String, AgentStats>, String> {
    get_json(&api_url("/api/agents/metrics")).await
}

pub async fn fetch_tool_usage() -> Result<BTreeMap<String, u64>, String> {
    get_json(&api_url("/api/agents/tools")).await
}

// ============================================================================
// Sessions
// ============================================================================

pub async fn create_session() -> Result<CreatedSession, String> {
    let response = Request::post(&api_url("/api/sessions/create"))
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;
    read_json(response).await
}

pub async fn fetch_session(session_id: &str) -> Result<SessionRecord, String> {
    get_json(&api_url(&format!("/api/sessions/{session_id}"))).await
}

pub async fn fetch_active_sessions() -> Result<Vec<SessionRecord>, String> {
    get_json(&api_url("/api/sessions/active")).await
}
