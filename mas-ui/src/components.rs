pub mod agent_panel;
pub mod chat;
pub mod layout;
pub mod metrics;
pub mod styles;

pub use agent_panel::{AgentCard, AgentPanel, ToolCallDetail, ToolTimeline};
pub use chat::{ChatPanel, ConnectionStatus, LoadingIndicator, MessageBubble};
pub use layout::{ConsoleLayout, Header, Notice};
pub use metrics::{MetricCard, MetricsPanel};
