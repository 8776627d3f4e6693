//! Shared types for the MAS chat backend contract
//!
//! These types mirror the JSON the backend emits over:
//! - the per-session WebSocket (`/ws/chat/{session_id}`)
//! - the REST API (`/api/chat`, `/api/agents`, `/api/sessions`)
//!
//! Serializable with serde; timestamps accept the shapes a Python backend
//! produces (RFC 3339, naive ISO-8601, epoch milliseconds).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Chat
// ============================================================================

/// Who authored a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Chat message as displayed in the transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_trace: Option<ExecutionTrace>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agent_responses: Vec<AgentResponse>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            execution_trace: None,
            agent_responses: Vec::new(),
        }
    }

    pub fn assistant(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            execution_trace: None,
            agent_responses: Vec::new(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Message as persisted by the backend session service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredMessage {
    pub id: String,
    pub content: String,
    pub role: Role,
    #[serde(default)]
    pub session_id: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub agent_responses: Option<Vec<AgentResponse>>,
}

impl From<StoredMessage> for ChatMessage {
    fn from(stored: StoredMessage) -> Self {
        Self {
            id: stored.id,
            role: stored.role,
            content: stored.content,
            timestamp: stored.timestamp,
            execution_trace: None,
            agent_responses: stored.agent_responses.unwrap_or_default(),
        }
    }
}

// ============================================================================
// Agent Execution
// ============================================================================

/// One tool invocation made by an agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub tool_name: String,
    pub tool_type: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub result: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub duration_ms: f64,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub success: bool,
}

/// What a single agent produced during one request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentResponse {
    pub agent_name: String,
    pub agent_type: String,
    pub response: String,
    #[serde(default)]
    pub tools_used: Vec<ToolCall>,
    #[serde(default)]
    pub processing_time_ms: f64,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Complete record of one request/response cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionTrace {
    pub session_id: String,
    pub request_id: String,
    pub user_message: String,
    pub coordinator_response: String,
    #[serde(default)]
    pub agent_sequence: Vec<String>,
    #[serde(default)]
    pub total_time_ms: f64,
    #[serde(default)]
    pub agent_responses: Vec<AgentResponse>,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Static description of an agent exposed by `/api/agents/info`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub agent_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Per-agent performance metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentStats {
    pub total_calls: u64,
    pub avg_response_time_ms: f64,
    #[serde(default)]
    pub total_time_ms: f64,
    #[serde(default)]
    pub tool_usage: BTreeMap<String, u64>,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub error_rate: f64,
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub execution_trace: ExecutionTrace,
    pub session_id: String,
}

/// Response body of `GET /api/agents/info`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCatalog {
    #[serde(default)]
    pub coordinator: serde_json::Value,
    #[serde(default)]
    pub agents: Vec<AgentInfo>,
}

/// Session as tracked by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub last_activity: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
    #[serde(default)]
    pub execution_traces: Vec<ExecutionTrace>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Response body of `POST /api/sessions/create`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
    pub session_id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Plain acknowledgement body (`{"message": "..."}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub message: String,
}

// ============================================================================
// WebSocket Protocol
// ============================================================================

/// Client → Server frames
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ChatMessage { content: String },
    Ping,
    Pong,
}

/// Inbound frame type tags
pub const WS_CONNECTION_ESTABLISHED: &str = "connection_established";
pub const WS_MESSAGE_RECEIVED: &str = "message_received";
pub const WS_AGENT_RESPONSE: &str = "agent_response";
pub const WS_EXECUTION_UPDATE: &str = "execution_update";
pub const WS_ERROR: &str = "error";
pub const WS_HEARTBEAT: &str = "heartbeat";
pub const WS_PONG: &str = "pong";

fn default_true() -> bool {
    true
}

// ============================================================================
// Timestamps
// ============================================================================

/// Serde adapter for backend timestamps.
///
/// Serializes as RFC 3339 (UTC, millisecond precision). Deserializes any shape
/// accepted by [`timestamp::parse`].
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    /// Parse a JSON timestamp: RFC 3339, naive ISO-8601 (taken as UTC) or
    /// epoch milliseconds.
    pub fn parse(value: &serde_json::Value) -> Option<DateTime<Utc>> {
        match value {
            serde_json::Value::String(raw) => parse_str(raw),
            serde_json::Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|ms| ms as i64))
                .and_then(DateTime::from_timestamp_millis),
            _ => None,
        }
    }

    pub fn parse_str(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        parse(&value).ok_or_else(|| D::Error::custom(format!("unrecognized timestamp: {value}")))
    }
}

// ============================================================================
// Tests
// ============================================================================
