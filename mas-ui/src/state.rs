//! Console state shared through Dioxus context.
//!
//! The client stores live outside the signal graph; each store change bumps a
//! revision signal so components that read the store re-render.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use mas_client::{resolve_session_id, MasClient, StoreChange};
use shared_types::{AgentInfo, AgentStats};

use crate::api::{
    client_config, fetch_active_sessions, fetch_agent_info, fetch_agent_metrics,
    fetch_chat_history, fetch_session, fetch_tool_usage, DEFAULT_HISTORY_LIMIT,
};
use crate::transport::{DioxusScheduler, LocalStorage, WebSocketConnector};

pub type ConsoleClient = MasClient<WebSocketConnector, DioxusScheduler>;

const PUMP_INTERVAL_MS: u32 = 16;

#[derive(Clone)]
pub struct Console {
    pub client: Rc<ConsoleClient>,
    pub chat_revision: Signal<u64>,
    pub tracking_revision: Signal<u64>,
    pub connected: Signal<bool>,
    pub agents: Signal<Vec<AgentInfo>>,
    pub server_metrics: Signal<BTreeMap<String, AgentStats>>,
    pub tool_usage: Signal<BTreeMap<String, u64>>,
    pub active_sessions: Signal<Option<usize>>,
    /// Creation time reported by the backend; `None` until the session exists there.
    pub session_started: Signal<Option<DateTime<Utc>>>,
    pub notice: Signal<Option<String>>,
}

impl Console {
    pub fn session_id(&self) -> &str {
        self.client.session_id()
    }

    pub fn show_notice(&self, message: impl Into<String>) {
        let mut notice = self.notice;
        notice.set(Some(message.into()));
    }

    /// Look the session up on the backend. A new id is unknown there until
    /// its first message, so a failure only logs.
    pub async fn refresh_session(self) {
        match fetch_session(self.session_id()).await {
            Ok(record) => {
                tracing::info!(
                    "Resumed session {} ({} stored messages)",
                    record.id,
                    record.messages.len()
                );
                let mut session_started = self.session_started;
                session_started.set(Some(record.created_at));
            }
            Err(e) => tracing::debug!("Session {} not known to backend: {}", self.session_id(), e),
        }
    }

    /// Refresh backend-side agent data; failures only log.
    pub async fn refresh_backend_data(self) {
        match fetch_agent_info().await {
            Ok(catalog) => {
                let mut agents = self.agents;
                agents.set(catalog.agents);
            }
            Err(e) => tracing::warn!("Failed to fetch agent info: {}", e),
        }

        match fetch_agent_metrics().await {
            Ok(metrics) => {
                let mut server_metrics = self.server_metrics;
                server_metrics.set(metrics);
            }
            Err(e) => tracing::warn!("Failed to fetch agent metrics: {}", e),
        }

        match fetch_tool_usage().await {
            Ok(usage) => {
                let mut tool_usage = self.tool_usage;
                tool_usage.set(usage);
            }
            Err(e) => tracing::warn!("Failed to fetch tool usage: {}", e),
        }

        match fetch_active_sessions().await {
            Ok(sessions) => {
                let mut active_sessions = self.active_sessions;
                active_sessions.set(Some(sessions.len()));
            }
            Err(e) => tracing::warn!("Failed to fetch active sessions: {}", e),
        }
    }
}

pub fn use_console() -> Console {
    use_context::<Console>()
}

/// Build the session client, provide it as context and start its event pump.
pub fn use_console_provider() -> Console {
    let chat_revision = use_signal(|| 0u64);
    let tracking_revision = use_signal(|| 0u64);
    let connected = use_signal(|| false);
    let agents = use_signal(Vec::<AgentInfo>::new);
    let server_metrics = use_signal(BTreeMap::<String, AgentStats>::new);
    let tool_usage = use_signal(BTreeMap::<String, u64>::new);
    let active_sessions = use_signal(|| None::<usize>);
    let session_started = use_signal(|| None::<DateTime<Utc>>);
    let notice = use_signal(|| None::<String>);
    let connector = use_hook(WebSocketConnector::new);
    let pump_alive = use_hook(|| Rc::new(Cell::new(true)));

    {
        let pump_alive = pump_alive.clone();
        use_drop(move || {
            pump_alive.set(false);
        });
    }

    let console = use_context_provider({
        let connector = connector.clone();
        move || {
            let session_id = resolve_session_id(&LocalStorage);
            let client = MasClient::new(
                client_config().clone(),
                session_id,
                connector,
                DioxusScheduler,
            );

            client.on_change(move |change| match change {
                StoreChange::Chat => {
                    let mut revision = chat_revision;
                    *revision.write() += 1;
                }
                StoreChange::Tracking => {
                    let mut revision = tracking_revision;
                    *revision.write() += 1;
                }
                StoreChange::Connection => {}
            });
            client.manager().on_status_change(move |is_connected| {
                let mut connected = connected;
                connected.set(is_connected);
            });

            Console {
                client: Rc::new(client),
                chat_revision,
                tracking_revision,
                connected,
                agents,
                server_metrics,
                tool_usage,
                active_sessions,
                session_started,
                notice,
            }
        }
    });

    // Socket event pump
    {
        let console = console.clone();
        use_hook(move || {
            spawn(async move {
                while pump_alive.get() {
                    for (id, event) in connector.drain() {
                        console.client.manager().handle_socket_event(id, event);
                    }
                    TimeoutFuture::new(PUMP_INTERVAL_MS).await;
                }
            });
        });
    }

    // Connect, then load history and backend data once
    {
        let console = console.clone();
        use_hook(move || {
            console.client.connect();
            spawn(async move {
                match fetch_chat_history(console.session_id(), DEFAULT_HISTORY_LIMIT).await {
                    Ok(history) if !history.is_empty() => console.client.load_history(history),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Failed to load chat history: {}", e),
                }
                console.clone().refresh_session().await;
                console.refresh_backend_data().await;
            });
        });
    }

    console
}
