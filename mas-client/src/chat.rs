//! Chat transcript state

use shared_types::ChatMessage;

use crate::protocol::{EventKind, ServerEvent};

/// Kinds the chat store reacts to
pub const HANDLED_KINDS: [EventKind; 3] = [
    EventKind::MessageReceived,
    EventKind::AgentResponse,
    EventKind::Error,
];

pub const ERROR_PREFIX: &str = "⚠️ Error: ";

/// Ordered chat messages plus the "waiting for a reply" flag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatStore {
    messages: Vec<ChatMessage>,
    loading: bool,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Swap in a transcript fetched from the history endpoint.
    pub fn replace_messages(&mut self, history: Vec<ChatMessage>) {
        self.messages = history;
    }

    /// Apply one inbound event. Returns true if the store changed.
    pub fn apply(&mut self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::MessageReceived(_) => {
                self.loading = true;
                true
            }
            ServerEvent::AgentResponse(frame) => {
                let id = frame
                    .message_id
                    .clone()
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                let mut message = ChatMessage::assistant(id, frame.content.clone());
                message.execution_trace = frame.execution_trace.clone();
                message.agent_responses = frame.agent_responses.clone().unwrap_or_default();
                self.messages.push(message);
                self.loading = false;
                true
            }
            ServerEvent::Error(frame) => {
                tracing::warn!("Backend reported error: {}", frame.error);
                // Error frames may echo the request's id; the bubble gets its own.
                self.messages.push(ChatMessage::assistant(
                    uuid::Uuid::new_v4().to_string(),
                    format!("{ERROR_PREFIX}{}", frame.error),
                ));
                self.loading = false;
                true
            }
            _ => false,
        }
    }
}
