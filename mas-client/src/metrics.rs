//! Per-agent performance aggregation

use std::collections::BTreeMap;

use serde::Serialize;
use shared_types::{AgentResponse, AgentStats};

/// Aggregate agent responses into per-agent stats, keyed by agent name.
///
/// Failed tool calls count as errors; the error rate is errors per call.
pub fn aggregate_agent_stats<'a, I>(responses: I) -> BTreeMap<String, AgentStats>
where
    I: IntoIterator<Item = &'a AgentResponse>,
{
    let mut stats: BTreeMap<String, AgentStats> = BTreeMap::new();

    for response in responses {
        let entry = stats.entry(response.agent_name.clone()).or_default();
        entry.total_calls += 1;
        entry.total_time_ms += response.processing_time_ms;
        for tool in &response.tools_used {
            *entry.tool_usage.entry(tool.tool_name.clone()).or_default() += 1;
            if !tool.success {
                entry.error_count += 1;
            }
        }
    }

    for entry in stats.values_mut() {
        if entry.total_calls > 0 {
            let calls = entry.total_calls as f64;
            entry.avg_response_time_ms = entry.total_time_ms / calls;
            entry.error_rate = entry.error_count as f64 / calls;
        }
    }

    stats
}

/// Tool call counts summed over all agents
pub fn total_tool_usage(stats: &BTreeMap<String, AgentStats>) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for entry in stats.values() {
        for (tool, count) in &entry.tool_usage {
            *totals.entry(tool.clone()).or_default() += count;
        }
    }
    totals
}

/// Headline numbers for the metrics panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SystemOverview {
    pub total_requests: u64,
    /// Mean of the per-agent averages; 0 with no agents.
    pub avg_response_time_ms: f64,
    pub active_agents: usize,
}

impl SystemOverview {
    pub fn from_stats(stats: &BTreeMap<String, AgentStats>) -> Self {
        let active_agents = stats.len();
        let total_requests = stats.values().map(|s| s.total_calls).sum();
        let avg_response_time_ms = if active_agents == 0 {
            0.0
        } else {
            stats.values().map(|s| s.avg_response_time_ms).sum::<f64>() / active_agents as f64
        };

        Self {
            total_requests,
            avg_response_time_ms,
            active_agents,
        }
    }
}
