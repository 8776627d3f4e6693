use dioxus::prelude::*;
use mas_client::format::{agent_color, agent_icon, format_duration, format_time};
use mas_client::ClientError;
use shared_types::ChatMessage;

use crate::api::send_chat_message;
use crate::state::{use_console, Console};

#[component]
pub fn ConnectionStatus() -> Element {
    let console = use_console();
    let connected = *console.connected.read();

    rsx! {
        div {
            class: if connected { "connection-status connected" } else { "connection-status" },
            span { class: "status-dot", "●" }
            span { if connected { "Connected" } else { "Disconnected" } }
        }
    }
}

/// Send through the socket; while it is down, fall back to the REST endpoint.
fn submit(console: &Console, text: String) {
    match console.client.send_chat(&text) {
        Ok(()) => {}
        Err(ClientError::NotConnected) => {
            let console = console.clone();
            spawn(async move {
                match send_chat_message(text.trim(), console.session_id()).await {
                    Ok(response) => console.client.record_rest_exchange(&text, response),
                    Err(e) => console.show_notice(format!("Failed to send message: {e}")),
                }
            });
        }
        Err(ClientError::EmptyMessage) => {}
        Err(e) => console.show_notice(format!("Failed to send message: {e}")),
    }
}

#[component]
pub fn ChatPanel() -> Element {
    let console = use_console();
    let mut input_text = use_signal(String::new);

    let _revision = *console.chat_revision.read();
    let (messages, loading) = {
        let chat = console.client.chat();
        (chat.messages().to_vec(), chat.is_loading())
    };

    let send_message = use_callback({
        let console = console.clone();
        move |_: ()| {
            let text = input_text.read().clone();
            if text.trim().is_empty() || console.client.chat().is_loading() {
                return;
            }
            input_text.set(String::new());
            submit(&console, text);
        }
    });

    let onkeydown = use_callback(move |e: KeyboardEvent| {
        if e.key() == Key::Enter && !e.modifiers().shift() {
            e.prevent_default();
            send_message.call(());
        }
    });

    let onclick = use_callback(move |_| {
        send_message.call(());
    });

    let oninput = use_callback(move |e: FormEvent| {
        input_text.set(e.value());
    });

    rsx! {
        div {
            class: "chat-panel",

            div {
                class: "panel-header",
                span { "MAS Chat" }
                ConnectionStatus {}
            }

            div {
                class: "messages-container",
                if messages.is_empty() && !loading {
                    div {
                        class: "empty-state",
                        p { "Start a conversation with the multi-agent system." }
                    }
                }
                for (idx, message) in messages.into_iter().enumerate() {
                    MessageBubble { key: "{idx}-{message.id}", message }
                }
                if loading {
                    LoadingIndicator {}
                }
            }

            div {
                class: "chat-input-container",
                textarea {
                    class: "chat-input",
                    rows: "2",
                    placeholder: "Type a message... (Enter to send, Shift+Enter for newline)",
                    value: "{input_text}",
                    disabled: loading,
                    oninput,
                    onkeydown,
                }
                button {
                    class: "send-button",
                    disabled: loading || input_text.read().trim().is_empty(),
                    onclick,
                    if loading { "..." } else { "Send" }
                }
            }
        }
    }
}

#[component]
pub fn MessageBubble(message: ChatMessage) -> Element {
    let is_user = message.is_user();
    let time = format_time(&message.timestamp);
    let total_time = message
        .execution_trace
        .as_ref()
        .map(|trace| format_duration(trace.total_time_ms));

    rsx! {
        div {
            class: if is_user { "message-row user-row" } else { "message-row assistant-row" },

            div { class: "message-bubble", "{message.content}" }

            if !message.agent_responses.is_empty() {
                div {
                    class: "agent-chips",
                    for response in message.agent_responses.iter() {
                        span {
                            class: "agent-chip",
                            style: "background: {agent_color(&response.agent_name)}",
                            "{agent_icon(&response.agent_name)} {response.agent_name}"
                        }
                    }
                }
            }

            div {
                class: "message-meta",
                if let Some(total_time) = total_time {
                    "{time} · {total_time}"
                } else {
                    "{time}"
                }
            }
        }
    }
}

#[component]
pub fn LoadingIndicator() -> Element {
    rsx! {
        div {
            class: "message-row assistant-row",
            div {
                class: "message-bubble typing-indicator",
                span {}
                span {}
                span {}
            }
        }
    }
}
