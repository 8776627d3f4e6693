//! Session client
//!
//! One [`ConnectionManager`] per session with the chat store and the agent
//! tracker wired to it. The view layer reads the stores and re-renders on
//! [`StoreChange`] notifications.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use shared_types::{ChatMessage, ChatResponse, ClientMessage, ExecutionTrace};

use crate::chat::{self, ChatStore};
use crate::config::ClientConfig;
use crate::connection::ConnectionManager;
use crate::error::ClientError;
use crate::registry::Subscription;
use crate::tracking::{self, AgentTracker};
use crate::transport::{Connector, Scheduler};

/// Which part of the client state changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreChange {
    Chat,
    Tracking,
    Connection,
}

type ChangeListener = Rc<dyn Fn(StoreChange)>;

#[derive(Default)]
struct Listeners(RefCell<Vec<ChangeListener>>);

impl Listeners {
    fn push(&self, listener: ChangeListener) {
        self.0.borrow_mut().push(listener);
    }

    fn notify(&self, change: StoreChange) {
        let listeners = self.0.borrow().clone();
        for listener in listeners {
            listener(change);
        }
    }
}

pub struct MasClient<C: Connector, S: Scheduler> {
    manager: Rc<ConnectionManager<C, S>>,
    chat: Rc<RefCell<ChatStore>>,
    tracker: Rc<RefCell<AgentTracker>>,
    listeners: Rc<Listeners>,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl<C, S> MasClient<C, S>
where
    C: Connector + 'static,
    S: Scheduler + 'static,
{
    pub fn new(config: ClientConfig, session_id: impl Into<String>, connector: C, scheduler: S) -> Self {
        let manager = ConnectionManager::new(config, session_id, connector, scheduler);
        let chat = Rc::new(RefCell::new(ChatStore::new()));
        let tracker = Rc::new(RefCell::new(AgentTracker::new()));
        let listeners = Rc::new(Listeners::default());
        let mut subscriptions = Vec::new();

        for kind in chat::HANDLED_KINDS {
            let chat = chat.clone();
            let listeners = listeners.clone();
            subscriptions.push(manager.register_handler(kind, move |event| {
                let changed = chat.borrow_mut().apply(event);
                if changed {
                    listeners.notify(StoreChange::Chat);
                }
            }));
        }

        for kind in tracking::HANDLED_KINDS {
            let tracker = tracker.clone();
            let listeners = listeners.clone();
            subscriptions.push(manager.register_handler(kind, move |event| {
                let changed = tracker.borrow_mut().apply(event);
                if changed {
                    listeners.notify(StoreChange::Tracking);
                }
            }));
        }

        {
            let listeners = listeners.clone();
            manager.on_status_change(move |_connected| listeners.notify(StoreChange::Connection));
        }

        Self {
            manager,
            chat,
            tracker,
            listeners,
            subscriptions: RefCell::new(subscriptions),
        }
    }

    pub fn manager(&self) -> &Rc<ConnectionManager<C, S>> {
        &self.manager
    }

    pub fn session_id(&self) -> &str {
        self.manager.session_id()
    }

    pub fn chat(&self) -> Ref<'_, ChatStore> {
        self.chat.borrow()
    }

    pub fn tracker(&self) -> Ref<'_, AgentTracker> {
        self.tracker.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    pub fn connect(&self) {
        self.manager.connect();
    }

    pub fn disconnect(&self) {
        self.manager.disconnect();
    }

    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(StoreChange) + 'static,
    {
        self.listeners.push(Rc::new(listener));
    }

    /// Send a user chat message.
    ///
    /// Blank input and a socket that cannot take the frame are rejected
    /// before any state changes, so `NotConnected` always means nothing was
    /// recorded. A transport failure after the message was recorded clears
    /// the loading flag and stops tracking, and the message stays.
    pub fn send_chat(&self, content: &str) -> Result<(), ClientError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        if !self.manager.can_send() {
            tracing::warn!("Cannot send message while disconnected");
            return Err(ClientError::NotConnected);
        }

        self.chat.borrow_mut().add_message(ChatMessage::user(content));
        self.chat.borrow_mut().set_loading(true);
        self.tracker.borrow_mut().start_tracking();
        self.listeners.notify(StoreChange::Chat);
        self.listeners.notify(StoreChange::Tracking);

        let frame = ClientMessage::ChatMessage {
            content: content.to_string(),
        };
        if let Err(e) = self.manager.send_message(&frame) {
            tracing::error!("Failed to send chat message: {}", e);
            self.chat.borrow_mut().set_loading(false);
            self.tracker.borrow_mut().stop_tracking();
            self.listeners.notify(StoreChange::Chat);
            self.listeners.notify(StoreChange::Tracking);
            return Err(e);
        }
        Ok(())
    }

    /// Replace the transcript with history fetched over REST.
    pub fn load_history(&self, history: Vec<ChatMessage>) {
        self.chat.borrow_mut().replace_messages(history);
        self.listeners.notify(StoreChange::Chat);
    }

    /// Adopt a trace obtained outside the socket.
    pub fn update_execution(&self, trace: ExecutionTrace) {
        self.tracker.borrow_mut().update_execution(trace);
        self.listeners.notify(StoreChange::Tracking);
    }

    /// Record a request answered by the REST send endpoint instead of the socket.
    pub fn record_rest_exchange(&self, content: &str, response: ChatResponse) {
        let trace = response.execution_trace;
        let mut reply = ChatMessage::assistant(trace.request_id.clone(), response.response);
        reply.agent_responses = trace.agent_responses.clone();
        reply.execution_trace = Some(trace.clone());
        {
            let mut chat = self.chat.borrow_mut();
            chat.add_message(ChatMessage::user(content.trim()));
            chat.add_message(reply);
            chat.set_loading(false);
        }
        self.tracker.borrow_mut().update_execution(trace);
        self.listeners.notify(StoreChange::Chat);
        self.listeners.notify(StoreChange::Tracking);
    }

    /// Clear the transcript and all tracking state.
    pub fn clear(&self) {
        {
            let mut chat = self.chat.borrow_mut();
            chat.clear_messages();
            chat.set_loading(false);
        }
        self.tracker.borrow_mut().clear_tracking();
        self.listeners.notify(StoreChange::Chat);
        self.listeners.notify(StoreChange::Tracking);
    }
}

impl<C: Connector, S: Scheduler> Drop for MasClient<C, S> {
    fn drop(&mut self) {
        for subscription in self.subscriptions.get_mut().drain(..) {
            subscription.unregister();
        }
    }
}
