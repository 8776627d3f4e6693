//! Agent execution tracking
//!
//! Streamed `execution_update` partials are appended while a request runs;
//! the terminal `agent_response` replaces the whole sequence with its own
//! array. Partials therefore never survive into the final view.

use shared_types::{AgentResponse, ExecutionTrace};

use crate::protocol::{EventKind, ServerEvent};

/// Kinds the tracker reacts to
pub const HANDLED_KINDS: [EventKind; 2] = [EventKind::ExecutionUpdate, EventKind::AgentResponse];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentTracker {
    current_trace: Option<ExecutionTrace>,
    agent_responses: Vec<AgentResponse>,
    is_executing: bool,
    progress: f64,
}

impl AgentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_trace(&self) -> Option<&ExecutionTrace> {
        self.current_trace.as_ref()
    }

    pub fn agent_responses(&self) -> &[AgentResponse] {
        &self.agent_responses
    }

    pub fn is_executing(&self) -> bool {
        self.is_executing
    }

    /// Completion estimate, 0..=100
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Mark a request as in flight. Responses from earlier requests are kept.
    pub fn start_tracking(&mut self) {
        self.is_executing = true;
        self.progress = 0.0;
        self.current_trace = None;
    }

    pub fn stop_tracking(&mut self) {
        self.is_executing = false;
        self.progress = 100.0;
    }

    pub fn update_progress(&mut self, progress: f64) {
        self.progress = progress.clamp(0.0, 100.0);
    }

    /// Adopt a complete trace, e.g. one returned by the REST send endpoint.
    pub fn update_execution(&mut self, trace: ExecutionTrace) {
        self.agent_responses = trace.agent_responses.clone();
        self.current_trace = Some(trace);
        self.is_executing = false;
        self.progress = 100.0;
    }

    pub fn clear_tracking(&mut self) {
        *self = Self::default();
    }

    /// Apply one inbound event. Returns true if the tracker changed.
    pub fn apply(&mut self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::ExecutionUpdate(update) => {
                let Some(partial) = update.to_agent_response() else {
                    tracing::debug!("Ignoring execution_update without agent_name");
                    return false;
                };
                self.agent_responses.push(partial);
                self.is_executing = true;
                if let Some(progress) = update.progress() {
                    self.update_progress(progress);
                }
                true
            }
            ServerEvent::AgentResponse(frame) => {
                let Some(responses) = &frame.agent_responses else {
                    return false;
                };
                self.agent_responses = responses.clone();
                if let Some(trace) = &frame.execution_trace {
                    self.current_trace = Some(trace.clone());
                }
                self.is_executing = false;
                self.progress = 100.0;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode;
    use serde_json::json;

    fn update(agent: &str, index: usize) -> ServerEvent {
        decode(
            &json!({
                "type": "execution_update",
                "agent_name": agent,
                "agent_sequence": ["Greeter Agent", "RAG Agent", "Weather Agent", "MAS Coordinator"],
                "current_agent_index": index
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_start_keeps_previous_responses() {
        let mut tracker = AgentTracker::new();
        tracker.apply(&update("Greeter Agent", 0));
        tracker.start_tracking();
        assert!(tracker.is_executing());
        assert_eq!(tracker.progress(), 0.0);
        assert_eq!(tracker.agent_responses().len(), 1);
        assert!(tracker.current_trace().is_none());
    }

    #[test]
    fn test_partial_appends_and_sets_progress() {
        let mut tracker = AgentTracker::new();
        assert!(tracker.apply(&update("RAG Agent", 1)));
        assert_eq!(tracker.progress(), 50.0);
        assert!(tracker.is_executing());
        assert_eq!(tracker.agent_responses()[0].response, "Processing...");
    }

    #[test]
    fn test_update_without_agent_name_is_ignored() {
        let mut tracker = AgentTracker::new();
        let event = decode(r#"{"type":"execution_update","agent_name":""}"#).unwrap();
        assert!(!tracker.apply(&event));
        assert_eq!(tracker, AgentTracker::new());
    }

    #[test]
    fn test_terminal_without_array_leaves_state() {
        let mut tracker = AgentTracker::new();
        tracker.start_tracking();
        let event = decode(r#"{"type":"agent_response","content":"hi"}"#).unwrap();
        assert!(!tracker.apply(&event));
        assert!(tracker.is_executing());
    }

    #[test]
    fn test_terminal_stores_trace() {
        let mut tracker = AgentTracker::new();
        tracker.start_tracking();
        let event = decode(
            &json!({
                "type": "agent_response",
                "content": "Sunny",
                "agent_responses": [],
                "execution_trace": {
                    "session_id": "s-1",
                    "request_id": "r-1",
                    "user_message": "weather?",
                    "coordinator_response": "Sunny",
                    "timestamp": "2025-03-04T10:20:31"
                }
            })
            .to_string(),
        )
        .unwrap();
        tracker.apply(&event);
        assert_eq!(tracker.current_trace().unwrap().request_id, "r-1");
        assert!(!tracker.is_executing());
        assert_eq!(tracker.progress(), 100.0);
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut tracker = AgentTracker::new();
        tracker.update_progress(140.0);
        assert_eq!(tracker.progress(), 100.0);
        tracker.update_progress(-3.0);
        assert_eq!(tracker.progress(), 0.0);
    }

    #[test]
    fn test_stop_and_clear() {
        let mut tracker = AgentTracker::new();
        tracker.start_tracking();
        tracker.apply(&update("Weather Agent", 2));
        tracker.stop_tracking();
        assert!(!tracker.is_executing());
        assert_eq!(tracker.progress(), 100.0);

        tracker.clear_tracking();
        assert_eq!(tracker, AgentTracker::new());
    }
}
