use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use mas_client::export::{
    export_file_name, traces_from_messages, ChatExport, MetricsExport, CHAT_EXPORT_PREFIX,
    METRICS_EXPORT_PREFIX,
};
use mas_client::format::{format_time, truncate_text};
use mas_client::{SessionStorage, SESSION_STORAGE_KEY};

use super::agent_panel::AgentPanel;
use super::chat::{ChatPanel, ConnectionStatus};
use super::metrics::session_metrics;
use super::styles::CONSOLE_STYLES;
use crate::api::{clear_chat_history, create_session};
use crate::download::download_json;
use crate::state::{use_console, Console};
use crate::transport::LocalStorage;

fn export_chat(console: &Console) -> Result<(), String> {
    let now = Utc::now();
    let json = {
        let chat = console.client.chat();
        let messages = chat.messages();
        let traces = traces_from_messages(messages);
        ChatExport::build(messages, &traces, Some(console.session_id()), now)
            .to_json_pretty()
            .map_err(|e| e.to_string())?
    };
    download_json(&export_file_name(CHAT_EXPORT_PREFIX, now), &json)
}

fn export_metrics(console: &Console) -> Result<(), String> {
    let now = Utc::now();
    let metrics = {
        let tracker = console.client.tracker();
        session_metrics(console, tracker.agent_responses())
    };
    let json = MetricsExport::new(metrics, now)
        .to_json_pretty()
        .map_err(|e| e.to_string())?;
    download_json(&export_file_name(METRICS_EXPORT_PREFIX, now), &json)
}

/// Ask the backend for a fresh session, remember it and restart the app on it.
async fn start_new_session() -> Result<(), String> {
    let created = create_session().await?;
    LocalStorage
        .set(SESSION_STORAGE_KEY, &created.session_id)
        .map_err(|e| e.to_string())?;
    tracing::info!("Switching to session {}", created.session_id);
    web_sys::window()
        .ok_or_else(|| "Window is unavailable".to_string())?
        .location()
        .reload()
        .map_err(|e| format!("{e:?}"))
}

fn session_label(session_id: &str, started: Option<DateTime<Utc>>) -> String {
    let short_id = truncate_text(session_id, 8);
    match started {
        Some(started) => format!("Session {short_id} · since {}", format_time(&started)),
        None => format!("Session {short_id}"),
    }
}

#[component]
pub fn Header() -> Element {
    let console = use_console();
    let connected = *console.connected.read();
    let session_label = session_label(console.session_id(), *console.session_started.read());

    let on_export_chat = {
        let console = console.clone();
        move |_: MouseEvent| {
            if let Err(e) = export_chat(&console) {
                console.show_notice(format!("Chat export failed: {e}"));
            }
        }
    };

    let on_export_metrics = {
        let console = console.clone();
        move |_: MouseEvent| {
            if let Err(e) = export_metrics(&console) {
                console.show_notice(format!("Metrics export failed: {e}"));
            }
        }
    };

    let on_clear = {
        let console = console.clone();
        move |_: MouseEvent| {
            console.client.clear();
            let console = console.clone();
            spawn(async move {
                if let Err(e) = clear_chat_history(console.session_id()).await {
                    console.show_notice(format!("Failed to clear history: {e}"));
                }
            });
        }
    };

    let on_new_session = {
        let console = console.clone();
        move |_: MouseEvent| {
            let console = console.clone();
            spawn(async move {
                if let Err(e) = start_new_session().await {
                    console.show_notice(format!("Failed to create session: {e}"));
                }
            });
        }
    };

    let on_reconnect = {
        let console = console.clone();
        move |_: MouseEvent| console.client.connect()
    };

    rsx! {
        header {
            class: "console-header",
            div {
                class: "console-title",
                span { "🤖" }
                span { "MAS Testing Interface" }
                span { class: "console-subtitle", "Real-time Multi-Agent System Visualization" }
            }
            span { class: "console-subtitle", "{session_label}" }
            ConnectionStatus {}
            div {
                class: "header-actions",
                if !connected {
                    button { class: "header-button", onclick: on_reconnect, "Reconnect" }
                }
                button { class: "header-button", onclick: on_export_chat, "Export Chat" }
                button { class: "header-button", onclick: on_export_metrics, "Export Metrics" }
                button { class: "header-button", onclick: on_clear, "Clear" }
                button { class: "header-button", onclick: on_new_session, "New Session" }
            }
        }
    }
}

#[component]
pub fn Notice() -> Element {
    let console = use_console();
    let mut notice = console.notice;
    let Some(message) = notice.read().clone() else {
        return rsx! {};
    };

    rsx! {
        div {
            class: "console-notice",
            span { "{message}" }
            button {
                class: "header-button",
                onclick: move |_| notice.set(None),
                "Dismiss"
            }
        }
    }
}

/// Chat on the left, agent activity on the right.
#[component]
pub fn ConsoleLayout() -> Element {
    rsx! {
        style { {CONSOLE_STYLES} }

        div {
            class: "console",
            Header {}
            Notice {}
            div {
                class: "split-layout",
                div { class: "split-left", ChatPanel {} }
                div { class: "split-right", AgentPanel {} }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn session_label_shortens_id_and_shows_backend_start() {
        let started = Utc.with_ymd_and_hms(2025, 3, 4, 9, 5, 0).unwrap();
        assert_eq!(
            session_label("0f8e2c1a-77aa-4d2b-9c1e-3b5a", Some(started)),
            "Session 0f8e2c1a... · since 09:05:00"
        );
        assert_eq!(session_label("abc", None), "Session abc");
    }
}
