use dioxus::prelude::*;
use mas_client::format::{agent_color, agent_icon, format_duration, format_time};
use mas_client::timeline::{build_timeline, TimelineEventKind};
use shared_types::{AgentResponse, ExecutionTrace, ToolCall};

use super::metrics::MetricsPanel;
use crate::state::use_console;

#[derive(Clone, Copy, PartialEq, Eq)]
enum PanelTab {
    Timeline,
    Responses,
    Metrics,
}

impl PanelTab {
    const ALL: [PanelTab; 3] = [PanelTab::Timeline, PanelTab::Responses, PanelTab::Metrics];

    fn label(self) -> &'static str {
        match self {
            PanelTab::Timeline => "Timeline",
            PanelTab::Responses => "Responses",
            PanelTab::Metrics => "Metrics",
        }
    }
}

#[component]
pub fn AgentPanel() -> Element {
    let console = use_console();
    let mut active_tab = use_signal(|| PanelTab::Timeline);

    let _revision = *console.tracking_revision.read();
    let (trace, responses, executing, progress) = {
        let tracker = console.client.tracker();
        (
            tracker.current_trace().cloned(),
            tracker.agent_responses().to_vec(),
            tracker.is_executing(),
            tracker.progress(),
        )
    };

    rsx! {
        div {
            class: "agent-panel",

            div {
                class: "panel-header",
                span { "Agent Activity" }
                if executing {
                    span { class: "progress-chip", "Processing... {progress:.0}%" }
                }
            }

            if executing {
                div {
                    class: "progress-bar",
                    div { class: "progress-fill", style: "width: {progress}%" }
                }
            }

            div {
                class: "panel-tabs",
                for tab in PanelTab::ALL {
                    button {
                        class: if active_tab() == tab { "panel-tab active" } else { "panel-tab" },
                        onclick: move |_| active_tab.set(tab),
                        "{tab.label()}"
                    }
                }
            }

            div {
                class: "panel-body",
                {
                    match active_tab() {
                        PanelTab::Timeline => rsx! {
                            ToolTimeline { trace, responses: responses.clone() }
                        },
                        PanelTab::Responses => rsx! {
                            if responses.is_empty() {
                                p { class: "empty-state", "No agent responses yet." }
                            }
                            for (idx, response) in responses.iter().enumerate() {
                                AgentCard { key: "{idx}", response: response.clone() }
                            }
                        },
                        PanelTab::Metrics => rsx! {
                            MetricsPanel { responses: responses.clone() }
                        },
                    }
                }
            }
        }
    }
}

#[component]
pub fn AgentCard(response: AgentResponse) -> Element {
    let mut expanded = use_signal(|| false);
    let color = agent_color(&response.agent_name);
    let icon = agent_icon(&response.agent_name);
    let tool_count = response.tools_used.len();
    let duration = format_duration(response.processing_time_ms);

    rsx! {
        div {
            class: "agent-card",
            style: "border-left-color: {color}",

            div {
                class: "agent-card-header",
                onclick: move |_| expanded.set(!expanded()),
                div {
                    class: "agent-info",
                    span { class: "agent-icon", "{icon}" }
                    div {
                        div { "{response.agent_name}" }
                        div { class: "agent-type", "{response.agent_type}" }
                    }
                }
                div {
                    class: "agent-stats",
                    span { class: "stat-chip", "🔧 {tool_count} tools" }
                    span { class: "stat-chip", "⏱ {duration}" }
                    span { if expanded() { "▲" } else { "▼" } }
                }
            }

            if expanded() {
                div {
                    class: "agent-details",
                    div { class: "section-label", "Response" }
                    div { class: "response-text", "{response.response}" }
                    if tool_count > 0 {
                        div { class: "section-label", "Tools Used" }
                        for (idx, tool) in response.tools_used.iter().enumerate() {
                            ToolCallDetail { key: "{idx}", tool_call: tool.clone() }
                        }
                    }
                }
            }
        }
    }
}

fn pretty_json(value: &serde_json::Map<String, serde_json::Value>) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

#[component]
pub fn ToolCallDetail(tool_call: ToolCall) -> Element {
    let mut expanded = use_signal(|| false);
    let success = tool_call.success;
    let duration = format_duration(tool_call.duration_ms);
    let parameters = (!tool_call.parameters.is_empty()).then(|| pretty_json(&tool_call.parameters));
    let result = pretty_json(&tool_call.result);

    rsx! {
        div {
            class: "tool-call",

            div {
                class: "tool-call-header",
                onclick: move |_| expanded.set(!expanded()),
                span { "⚙ {tool_call.tool_name}" }
                span {
                    class: if success { "tool-status success" } else { "tool-status failed" },
                    if success { "✓ Success" } else { "✗ Failed" }
                }
                span { class: "stat-chip", "{duration}" }
            }

            if expanded() {
                if let Some(parameters) = parameters {
                    div { class: "section-label", "Parameters" }
                    pre { class: "tool-json", "{parameters}" }
                }
                div { class: "section-label", "Result" }
                pre { class: "tool-json", "{result}" }
            }
        }
    }
}

const FAILED_COLOR: &str = "#ef4444";

struct TimelineRow {
    time: String,
    color: &'static str,
    title: String,
    duration: Option<String>,
}

#[component]
pub fn ToolTimeline(
    #[props(!optional)] trace: Option<ExecutionTrace>,
    responses: Vec<AgentResponse>,
) -> Element {
    // A finished trace is authoritative; otherwise show the streamed partials.
    let source = trace
        .as_ref()
        .map(|t| t.agent_responses.clone())
        .unwrap_or(responses);
    let rows: Vec<TimelineRow> = build_timeline(&source)
        .into_iter()
        .map(|event| TimelineRow {
            time: format_time(&event.timestamp),
            color: if event.kind == TimelineEventKind::ToolCall && !event.success {
                FAILED_COLOR
            } else {
                agent_color(&event.agent)
            },
            title: event.title(),
            duration: event.duration_ms.map(format_duration),
        })
        .collect();

    if rows.is_empty() {
        return rsx! {
            p {
                class: "empty-state",
                "No execution data yet. Send a message to see the agent activity timeline."
            }
        };
    }

    rsx! {
        div {
            class: "timeline",
            for (idx, row) in rows.into_iter().enumerate() {
                div {
                    key: "{idx}",
                    class: "timeline-event",
                    span { class: "timeline-time", "{row.time}" }
                    span { class: "timeline-marker", style: "background: {row.color}" }
                    span { "{row.title}" }
                    if let Some(duration) = row.duration {
                        span { class: "stat-chip", "{duration}" }
                    }
                }
            }
            if let Some(trace) = trace {
                div {
                    class: "timeline-footer",
                    "Total execution time: {format_duration(trace.total_time_ms)}"
                }
            }
        }
    }
}
