use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_API_URL: &str = "MAS_API_URL";
pub const ENV_WS_URL: &str = "MAS_WS_URL";
pub const ENV_RECONNECT_DELAY_MS: &str = "MAS_RECONNECT_DELAY_MS";
pub const ENV_KEEPALIVE_SECS: &str = "MAS_KEEPALIVE_SECS";

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash
    pub api_base: String,
    /// Base URL of the WebSocket endpoint, without trailing slash
    pub ws_base: String,
    /// Fixed delay before reconnecting after an abnormal close
    pub reconnect_delay: Duration,
    /// Client-initiated ping interval; `None` disables keep-alive pings
    pub keepalive_interval: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }
}

impl ClientConfig {
    /// Config for `api_base`, deriving the socket base from it.
    pub fn with_api_base(api_base: &str) -> Self {
        let api_base = trim_base(api_base);
        Self {
            ws_base: http_to_ws_url(&api_base),
            api_base,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            keepalive_interval: None,
        }
    }

    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env loaded: {}", e);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = match get(ENV_API_URL) {
            Some(api_base) => Self::with_api_base(&api_base),
            None => Self::default(),
        };

        if let Some(ws_base) = get(ENV_WS_URL) {
            config.ws_base = trim_base(&ws_base);
        }

        if let Some(raw) = get(ENV_RECONNECT_DELAY_MS) {
            config.reconnect_delay = Duration::from_millis(parse_number(ENV_RECONNECT_DELAY_MS, &raw)?);
        }

        if let Some(raw) = get(ENV_KEEPALIVE_SECS) {
            config.keepalive_interval = match parse_number(ENV_KEEPALIVE_SECS, &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            };
        }

        Ok(config)
    }

    /// `<ws_base>/ws/chat/<session_id>`
    pub fn socket_url(&self, session_id: &str) -> String {
        format!("{}/ws/chat/{}", self.ws_base, session_id)
    }

    /// `<api_base><path>`; `path` starts with `/`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

pub fn http_to_ws_url(http_url: &str) -> String {
    if let Some(rest) = http_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if let Some(rest) = http_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if http_url.is_empty() || http_url.starts_with("ws://") || http_url.starts_with("wss://") {
        http_url.to_string()
    } else {
        format!("ws://{http_url}")
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_number(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
