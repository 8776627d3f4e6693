//! Display helpers shared by the views

use chrono::{DateTime, Utc};

pub const DEFAULT_AGENT_COLOR: &str = "#95a5a6";
pub const DEFAULT_AGENT_ICON: &str = "🤖";

const AGENT_STYLES: [(&str, &str, &str); 6] = [
    ("Weather Agent", "#3498db", "🌤️"),
    ("RAG Agent", "#9b59b6", "📚"),
    ("Academic WebSearch", "#e74c3c", "🔍"),
    ("Academic NewResearch", "#e67e22", "🔬"),
    ("Greeter Agent", "#2ecc71", "👋"),
    ("MAS Coordinator", "#34495e", "🤖"),
];

pub fn agent_color(agent_name: &str) -> &'static str {
    AGENT_STYLES
        .iter()
        .find(|(name, _, _)| *name == agent_name)
        .map_or(DEFAULT_AGENT_COLOR, |(_, color, _)| *color)
}

pub fn agent_icon(agent_name: &str) -> &'static str {
    AGENT_STYLES
        .iter()
        .find(|(name, _, _)| *name == agent_name)
        .map_or(DEFAULT_AGENT_ICON, |(_, _, icon)| *icon)
}

/// `850ms`, `1.5s`, `2.0m`
pub fn format_duration(ms: f64) -> String {
    if ms < 1_000.0 {
        format!("{ms}ms")
    } else if ms < 60_000.0 {
        format!("{:.1}s", ms / 1_000.0)
    } else {
        format!("{:.1}m", ms / 60_000.0)
    }
}

/// `HH:MM:SS`
pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%H:%M:%S").to_string()
}

/// Cut to `max_chars` characters and append `...` when anything was cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(850.0), "850ms");
        assert_eq!(format_duration(1_500.0), "1.5s");
        assert_eq!(format_duration(59_999.0), "60.0s");
        assert_eq!(format_duration(120_000.0), "2.0m");
    }

    #[test]
    fn test_format_time() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 4, 9, 5, 7).unwrap();
        assert_eq!(format_time(&ts), "09:05:07");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("ééé", 2), "éé...");
        assert_eq!(truncate_text("abc", 3), "abc");
    }

    #[test]
    fn test_agent_lookup_with_fallback() {
        assert_eq!(agent_color("RAG Agent"), "#9b59b6");
        assert_eq!(agent_icon("Weather Agent"), "🌤️");
        assert_eq!(agent_color("Mystery"), DEFAULT_AGENT_COLOR);
        assert_eq!(agent_icon("Mystery"), DEFAULT_AGENT_ICON);
    }
}
