//! JSON export documents for the chat transcript and agent metrics

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use shared_types::{AgentStats, ChatMessage, ExecutionTrace};

pub const CHAT_EXPORT_PREFIX: &str = "mas-chat-export";
pub const METRICS_EXPORT_PREFIX: &str = "mas-metrics-export";
pub const EXPORT_GENERATOR: &str = "MAS Testing Interface";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total_messages: usize,
    pub total_agent_calls: usize,
    /// Sum of trace totals divided by agent calls; 0 without calls.
    pub avg_response_time: f64,
    pub agents_used: Vec<String>,
    pub tools_used: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExport {
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub execution_traces: Vec<ExecutionTrace>,
    pub summary: ExportSummary,
}

impl ChatExport {
    pub fn build(
        messages: &[ChatMessage],
        traces: &[ExecutionTrace],
        session_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut agents = BTreeSet::new();
        let mut tools = BTreeSet::new();
        let mut total_time_ms = 0.0;
        let mut total_agent_calls = 0;

        for trace in traces {
            total_time_ms += trace.total_time_ms;
            for response in &trace.agent_responses {
                agents.insert(response.agent_name.clone());
                total_agent_calls += 1;
                for tool in &response.tools_used {
                    tools.insert(tool.tool_name.clone());
                }
            }
        }

        let avg_response_time = if total_agent_calls > 0 {
            total_time_ms / total_agent_calls as f64
        } else {
            0.0
        };

        Self {
            timestamp: iso_timestamp(now),
            session_id: session_id.map(str::to_string),
            messages: messages.to_vec(),
            execution_traces: traces.to_vec(),
            summary: ExportSummary {
                total_messages: messages.len(),
                total_agent_calls,
                avg_response_time,
                agents_used: agents.into_iter().collect(),
                tools_used: tools.into_iter().collect(),
            },
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Execution traces carried by a transcript, in message order.
pub fn traces_from_messages(messages: &[ChatMessage]) -> Vec<ExecutionTrace> {
    messages
        .iter()
        .filter_map(|message| message.execution_trace.clone())
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsExport {
    pub timestamp: String,
    pub metrics: BTreeMap<String, AgentStats>,
    pub generated: &'static str,
}

impl MetricsExport {
    pub fn new(metrics: BTreeMap<String, AgentStats>, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: iso_timestamp(now),
            metrics,
            generated: EXPORT_GENERATOR,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// `<prefix>-<ISO time with ':' and '.' replaced by '-'>.json`
pub fn export_file_name(prefix: &str, now: DateTime<Utc>) -> String {
    let stamp = iso_timestamp(now).replace([':', '.'], "-");
    format!("{prefix}-{stamp}.json")
}

fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
