use std::collections::BTreeMap;

use dioxus::prelude::*;
use mas_client::format::{agent_icon, format_duration};
use mas_client::metrics::{aggregate_agent_stats, total_tool_usage, SystemOverview};
use shared_types::{AgentResponse, AgentStats};

use crate::state::{use_console, Console};

/// Session stats from tracked responses; the backend's totals until the
/// session has any.
pub fn session_metrics(console: &Console, responses: &[AgentResponse]) -> BTreeMap<String, AgentStats> {
    let local = aggregate_agent_stats(responses);
    if local.is_empty() {
        console.server_metrics.read().clone()
    } else {
        local
    }
}

fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

#[component]
pub fn MetricCard(label: String, value: String) -> Element {
    rsx! {
        div {
            class: "metric-card",
            div { class: "metric-label", "{label}" }
            div { class: "metric-value", "{value}" }
        }
    }
}

#[component]
pub fn MetricsPanel(responses: Vec<AgentResponse>) -> Element {
    let console = use_console();
    let stats = session_metrics(&console, &responses);
    let overview = SystemOverview::from_stats(&stats);

    let tool_usage = {
        let server_usage = console.tool_usage.read();
        if responses.is_empty() && !server_usage.is_empty() {
            server_usage.clone()
        } else {
            total_tool_usage(&stats)
        }
    };
    let active_sessions = *console.active_sessions.read();

    rsx! {
        div { class: "section-label", "System Overview" }
        div {
            class: "metric-grid",
            MetricCard { label: "Total Requests", value: "{overview.total_requests}" }
            MetricCard {
                label: "Avg Response Time",
                value: format_duration(overview.avg_response_time_ms),
            }
            MetricCard { label: "Active Agents", value: "{overview.active_agents}" }
            if let Some(count) = active_sessions {
                MetricCard { label: "Active Sessions", value: "{count}" }
            }
        }

        div { class: "section-label", "Agent Performance" }
        if stats.is_empty() {
            p { class: "empty-state", "No agent activity recorded." }
        } else {
            table {
                class: "metrics-table",
                thead {
                    tr {
                        th { "Agent" }
                        th { "Calls" }
                        th { "Avg Time" }
                        th { "Errors" }
                        th { "Error Rate" }
                    }
                }
                tbody {
                    for (name, entry) in stats.iter() {
                        tr {
                            key: "{name}",
                            td { "{agent_icon(name)} {name}" }
                            td { "{entry.total_calls}" }
                            td { "{format_duration(entry.avg_response_time_ms)}" }
                            td { "{entry.error_count}" }
                            td { "{format_rate(entry.error_rate)}" }
                        }
                    }
                }
            }
        }

        if !tool_usage.is_empty() {
            div { class: "section-label", "Tool Usage" }
            table {
                class: "metrics-table",
                tbody {
                    for (tool, count) in tool_usage.iter() {
                        tr {
                            key: "{tool}",
                            td { "{tool}" }
                            td { "{count}" }
                        }
                    }
                }
            }
        }
    }
}
