use chrono::{DateTime, Utc};
use shared_types::AgentResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineEventKind {
    AgentStart,
    ToolCall,
    AgentComplete,
}

impl TimelineEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TimelineEventKind::AgentStart => "agent_start",
            TimelineEventKind::ToolCall => "tool_call",
            TimelineEventKind::AgentComplete => "agent_complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEvent {
    pub kind: TimelineEventKind,
    pub agent: String,
    pub tool: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: Option<f64>,
    pub success: bool,
}

impl TimelineEvent {
    pub fn title(&self) -> String {
        match self.kind {
            TimelineEventKind::AgentStart => format!("{} Started", self.agent),
            TimelineEventKind::ToolCall => {
                format!("Tool: {}", self.tool.as_deref().unwrap_or_default())
            }
            TimelineEventKind::AgentComplete => format!("{} Complete", self.agent),
        }
    }
}

/// Start, tool calls and completion per response, in timestamp order.
///
/// The sort is stable, so events sharing a timestamp keep emission order.
pub fn build_timeline(responses: &[AgentResponse]) -> Vec<TimelineEvent> {
    let mut events = Vec::with_capacity(responses.len() * 2);

    for response in responses {
        events.push(TimelineEvent {
            kind: TimelineEventKind::AgentStart,
            agent: response.agent_name.clone(),
            tool: None,
            timestamp: response.timestamp,
            duration_ms: None,
            success: true,
        });
        for tool in &response.tools_used {
            events.push(TimelineEvent {
                kind: TimelineEventKind::ToolCall,
                agent: response.agent_name.clone(),
                tool: Some(tool.tool_name.clone()),
                timestamp: tool.timestamp,
                duration_ms: Some(tool.duration_ms),
                success: tool.success,
            });
        }
        events.push(TimelineEvent {
            kind: TimelineEventKind::AgentComplete,
            agent: response.agent_name.clone(),
            tool: None,
            timestamp: response.timestamp,
            duration_ms: Some(response.processing_time_ms),
            success: true,
        });
    }

    events.sort_by_key(|event| event.timestamp);
    events
}
