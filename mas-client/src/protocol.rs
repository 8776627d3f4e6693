//! Inbound WebSocket protocol
//!
//! Every text frame is decoded exactly once into a [`ServerEvent`]. Payload
//! fields the backend may omit or null out are filled here, so nothing past
//! this module deals with raw JSON.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use shared_types::{timestamp, AgentResponse, ExecutionTrace, ToolCall};

use crate::error::DecodeError;

pub const UNKNOWN_AGENT_NAME: &str = "Unknown Agent";
pub const UNKNOWN_AGENT_TYPE: &str = "unknown";
pub const PENDING_RESPONSE_TEXT: &str = "Processing...";
pub const UNKNOWN_ERROR_TEXT: &str = "Unknown error";

/// Inbound message kinds, keyed by their wire `type` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    ConnectionEstablished,
    MessageReceived,
    AgentResponse,
    ExecutionUpdate,
    Error,
    Heartbeat,
    Pong,
}

impl EventKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::ConnectionEstablished => shared_types::WS_CONNECTION_ESTABLISHED,
            EventKind::MessageReceived => shared_types::WS_MESSAGE_RECEIVED,
            EventKind::AgentResponse => shared_types::WS_AGENT_RESPONSE,
            EventKind::ExecutionUpdate => shared_types::WS_EXECUTION_UPDATE,
            EventKind::Error => shared_types::WS_ERROR,
            EventKind::Heartbeat => shared_types::WS_HEARTBEAT,
            EventKind::Pong => shared_types::WS_PONG,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DecodeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            shared_types::WS_CONNECTION_ESTABLISHED => Ok(EventKind::ConnectionEstablished),
            shared_types::WS_MESSAGE_RECEIVED => Ok(EventKind::MessageReceived),
            shared_types::WS_AGENT_RESPONSE => Ok(EventKind::AgentResponse),
            shared_types::WS_EXECUTION_UPDATE => Ok(EventKind::ExecutionUpdate),
            shared_types::WS_ERROR => Ok(EventKind::Error),
            shared_types::WS_HEARTBEAT => Ok(EventKind::Heartbeat),
            shared_types::WS_PONG => Ok(EventKind::Pong),
            other => Err(DecodeError::UnknownType(other.to_string())),
        }
    }
}

/// A decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    ConnectionEstablished(ConnectionEstablished),
    MessageReceived(MessageReceived),
    AgentResponse(AgentResponseFrame),
    ExecutionUpdate(ExecutionUpdate),
    Error(ErrorFrame),
    Heartbeat,
    Pong,
}

impl ServerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ServerEvent::ConnectionEstablished(_) => EventKind::ConnectionEstablished,
            ServerEvent::MessageReceived(_) => EventKind::MessageReceived,
            ServerEvent::AgentResponse(_) => EventKind::AgentResponse,
            ServerEvent::ExecutionUpdate(_) => EventKind::ExecutionUpdate,
            ServerEvent::Error(_) => EventKind::Error,
            ServerEvent::Heartbeat => EventKind::Heartbeat,
            ServerEvent::Pong => EventKind::Pong,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionEstablished {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub agent_info: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageReceived {
    #[serde(default)]
    pub message_id: Option<String>,
}

/// Terminal response for one request
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponseFrame {
    pub content: String,
    pub message_id: Option<String>,
    /// `None` when the frame carried no `agent_responses` array.
    pub agent_responses: Option<Vec<AgentResponse>>,
    pub execution_trace: Option<ExecutionTrace>,
}

/// One streamed agent step
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionUpdate {
    pub agent_name: Option<String>,
    pub agent_type: String,
    pub response: String,
    pub tools_used: Vec<ToolCall>,
    pub processing_time_ms: f64,
    pub timestamp: DateTime<Utc>,
    pub agent_sequence: Option<Vec<String>>,
    pub current_agent_index: Option<usize>,
}

impl ExecutionUpdate {
    /// The partial record this update contributes, if it names an agent.
    pub fn to_agent_response(&self) -> Option<AgentResponse> {
        let agent_name = self.agent_name.as_ref()?;
        Some(AgentResponse {
            agent_name: agent_name.clone(),
            agent_type: self.agent_type.clone(),
            response: self.response.clone(),
            tools_used: self.tools_used.clone(),
            processing_time_ms: self.processing_time_ms,
            timestamp: self.timestamp,
        })
    }

    /// `(index + 1) / len * 100`, when both sequence and index are present.
    pub fn progress(&self) -> Option<f64> {
        let sequence = self.agent_sequence.as_ref()?;
        let index = self.current_agent_index?;
        if sequence.is_empty() {
            return None;
        }
        let pct = (index as f64 + 1.0) / sequence.len() as f64 * 100.0;
        Some(pct.clamp(0.0, 100.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorFrame {
    pub error: String,
    pub message_id: Option<String>,
}

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Deserialize)]
struct RawToolCall {
    tool_name: Option<String>,
    tool_type: Option<String>,
    parameters: Option<serde_json::Map<String, Value>>,
    result: Option<serde_json::Map<String, Value>>,
    duration_ms: Option<f64>,
    timestamp: Option<Value>,
    success: Option<bool>,
}

#[derive(Deserialize)]
struct RawAgentResponse {
    agent_name: Option<String>,
    agent_type: Option<String>,
    response: Option<String>,
    tools_used: Option<Vec<RawToolCall>>,
    processing_time_ms: Option<f64>,
    timestamp: Option<Value>,
}

#[derive(Deserialize)]
struct RawAgentResponseFrame {
    content: Option<String>,
    message_id: Option<String>,
    agent_responses: Option<Vec<RawAgentResponse>>,
    execution_trace: Option<Value>,
}

#[derive(Deserialize)]
struct RawExecutionUpdate {
    agent_name: Option<String>,
    agent_type: Option<String>,
    response: Option<String>,
    tools_used: Option<Vec<RawToolCall>>,
    processing_time_ms: Option<f64>,
    timestamp: Option<Value>,
    agent_sequence: Option<Vec<String>>,
    current_agent_index: Option<usize>,
}

#[derive(Deserialize)]
struct RawErrorFrame {
    error: Option<String>,
    message_id: Option<String>,
}

fn timestamp_or_now(value: Option<&Value>) -> DateTime<Utc> {
    value.and_then(timestamp::parse).unwrap_or_else(Utc::now)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl From<RawToolCall> for ToolCall {
    fn from(raw: RawToolCall) -> Self {
        ToolCall {
            tool_name: raw.tool_name.unwrap_or_default(),
            tool_type: raw
                .tool_type
                .unwrap_or_else(|| UNKNOWN_AGENT_TYPE.to_string()),
            parameters: raw.parameters.unwrap_or_default(),
            result: raw.result.unwrap_or_default(),
            duration_ms: raw.duration_ms.unwrap_or_default(),
            timestamp: timestamp_or_now(raw.timestamp.as_ref()),
            success: raw.success.unwrap_or(true),
        }
    }
}

fn tools(raw: Option<Vec<RawToolCall>>) -> Vec<ToolCall> {
    raw.unwrap_or_default().into_iter().map(ToolCall::from).collect()
}

impl From<RawAgentResponse> for AgentResponse {
    fn from(raw: RawAgentResponse) -> Self {
        AgentResponse {
            agent_name: non_empty(raw.agent_name)
                .unwrap_or_else(|| UNKNOWN_AGENT_NAME.to_string()),
            agent_type: non_empty(raw.agent_type)
                .unwrap_or_else(|| UNKNOWN_AGENT_TYPE.to_string()),
            response: raw.response.unwrap_or_default(),
            tools_used: tools(raw.tools_used),
            processing_time_ms: raw.processing_time_ms.unwrap_or_default(),
            timestamp: timestamp_or_now(raw.timestamp.as_ref()),
        }
    }
}

impl From<RawAgentResponseFrame> for AgentResponseFrame {
    fn from(raw: RawAgentResponseFrame) -> Self {
        let execution_trace = raw.execution_trace.filter(|v| !v.is_null()).and_then(|v| {
            serde_json::from_value::<ExecutionTrace>(v)
                .map_err(|e| tracing::warn!("Dropping unreadable execution_trace: {}", e))
                .ok()
        });

        AgentResponseFrame {
            content: raw.content.unwrap_or_default(),
            message_id: non_empty(raw.message_id),
            agent_responses: raw
                .agent_responses
                .map(|list| list.into_iter().map(AgentResponse::from).collect()),
            execution_trace,
        }
    }
}

impl From<RawExecutionUpdate> for ExecutionUpdate {
    fn from(raw: RawExecutionUpdate) -> Self {
        ExecutionUpdate {
            agent_name: non_empty(raw.agent_name),
            agent_type: non_empty(raw.agent_type)
                .unwrap_or_else(|| UNKNOWN_AGENT_TYPE.to_string()),
            response: non_empty(raw.response)
                .unwrap_or_else(|| PENDING_RESPONSE_TEXT.to_string()),
            tools_used: tools(raw.tools_used),
            processing_time_ms: raw.processing_time_ms.unwrap_or_default(),
            timestamp: timestamp_or_now(raw.timestamp.as_ref()),
            agent_sequence: raw.agent_sequence,
            current_agent_index: raw.current_agent_index,
        }
    }
}

impl From<RawErrorFrame> for ErrorFrame {
    fn from(raw: RawErrorFrame) -> Self {
        ErrorFrame {
            error: non_empty(raw.error).unwrap_or_else(|| UNKNOWN_ERROR_TEXT.to_string()),
            message_id: non_empty(raw.message_id),
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode one inbound text frame.
pub fn decode(text: &str) -> Result<ServerEvent, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(DecodeError::Malformed)?;
    decode_value(value)
}

pub fn decode_value(value: Value) -> Result<ServerEvent, DecodeError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?
        .parse::<EventKind>()?;

    let event = match kind {
        EventKind::ConnectionEstablished => {
            ServerEvent::ConnectionEstablished(payload(kind, value)?)
        }
        EventKind::MessageReceived => ServerEvent::MessageReceived(payload(kind, value)?),
        EventKind::AgentResponse => {
            ServerEvent::AgentResponse(payload::<RawAgentResponseFrame>(kind, value)?.into())
        }
        EventKind::ExecutionUpdate => {
            ServerEvent::ExecutionUpdate(payload::<RawExecutionUpdate>(kind, value)?.into())
        }
        EventKind::Error => ServerEvent::Error(payload::<RawErrorFrame>(kind, value)?.into()),
        EventKind::Heartbeat => ServerEvent::Heartbeat,
        EventKind::Pong => ServerEvent::Pong,
    };
    Ok(event)
}

fn payload<T: DeserializeOwned>(kind: EventKind, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|source| DecodeError::InvalidPayload { kind, source })
}
