//! Per-session WebSocket connection manager.
//!
//! Owns the socket handle and the handler registry. Reconnects with a fixed
//! delay after any close that is not a normal closure, answers server
//! heartbeats, and dispatches decoded frames to handlers by kind.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use shared_types::ClientMessage;

use crate::config::ClientConfig;
use crate::error::{ClientError, DecodeError};
use crate::protocol::{self, EventKind, ServerEvent};
use crate::registry::{self, HandlerRegistry, Subscription};
use crate::transport::{
    is_normal_closure, ConnectionId, Connector, Scheduler, Socket, SocketEvent, CLOSE_NORMAL,
};

type StatusListener = Rc<dyn Fn(bool)>;

struct ActiveSocket<T> {
    id: ConnectionId,
    socket: T,
}

pub struct ConnectionManager<C: Connector, S: Scheduler> {
    config: ClientConfig,
    session_id: String,
    connector: C,
    scheduler: S,
    this: Weak<Self>,
    socket: RefCell<Option<ActiveSocket<C::Socket>>>,
    next_connection: Cell<u64>,
    connecting: Cell<bool>,
    connected: Cell<bool>,
    reconnect_attempts: Cell<u32>,
    reconnect_timer: RefCell<Option<S::Handle>>,
    keepalive_timer: RefCell<Option<S::Handle>>,
    handlers: Rc<RefCell<HandlerRegistry>>,
    status_listeners: RefCell<Vec<StatusListener>>,
}

impl<C, S> ConnectionManager<C, S>
where
    C: Connector + 'static,
    S: Scheduler + 'static,
{
    pub fn new(
        config: ClientConfig,
        session_id: impl Into<String>,
        connector: C,
        scheduler: S,
    ) -> Rc<Self> {
        let session_id = session_id.into();
        Rc::new_cyclic(|this| Self {
            config,
            session_id,
            connector,
            scheduler,
            this: this.clone(),
            socket: RefCell::new(None),
            next_connection: Cell::new(0),
            connecting: Cell::new(false),
            connected: Cell::new(false),
            reconnect_attempts: Cell::new(0),
            reconnect_timer: RefCell::new(None),
            keepalive_timer: RefCell::new(None),
            handlers: Rc::new(RefCell::new(HandlerRegistry::new())),
            status_listeners: RefCell::new(Vec::new()),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting.get()
    }

    pub fn has_pending_reconnect(&self) -> bool {
        self.reconnect_timer.borrow().is_some()
    }

    /// Reconnects scheduled since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts.get()
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.borrow().handler_count(kind)
    }

    /// Whether a frame handed to [`send_message`](Self::send_message) now
    /// would reach an open socket. The connected flag lags a dropped socket
    /// until its close event is handled.
    pub fn can_send(&self) -> bool {
        self.socket_is_open()
    }

    fn socket_is_open(&self) -> bool {
        self.socket
            .borrow()
            .as_ref()
            .is_some_and(|active| active.socket.is_open())
    }

    fn is_current(&self, id: ConnectionId) -> bool {
        self.socket
            .borrow()
            .as_ref()
            .is_some_and(|active| active.id == id)
    }

    /// Open the session socket unless one is open or opening.
    pub fn connect(&self) {
        if self.connecting.get() || self.socket_is_open() {
            tracing::debug!("Already connected or connecting");
            return;
        }

        self.cancel_reconnect();

        let stale = self.socket.borrow_mut().take();
        if let Some(stale) = stale {
            stale.socket.close(CLOSE_NORMAL, "Replaced by new connection");
        }

        let id = ConnectionId(self.next_connection.get() + 1);
        self.next_connection.set(id.0);
        let url = self.config.socket_url(&self.session_id);
        tracing::info!("Connecting to WebSocket: {}", url);

        self.connecting.set(true);
        match self.connector.open(&url, id) {
            Ok(socket) => {
                *self.socket.borrow_mut() = Some(ActiveSocket { id, socket });
            }
            Err(e) => {
                tracing::error!("Failed to create WebSocket: {}", e);
                self.connecting.set(false);
                self.set_connected(false);
                self.schedule_reconnect();
            }
        }
    }

    /// Close the socket with a normal closure and stop reconnecting.
    pub fn disconnect(&self) {
        self.cancel_reconnect();
        self.cancel_keepalive();

        let active = self.socket.borrow_mut().take();
        if let Some(active) = active {
            active.socket.close(CLOSE_NORMAL, "User disconnect");
            tracing::info!("WebSocket disconnected by client");
        }

        self.connecting.set(false);
        self.reconnect_attempts.set(0);
        self.set_connected(false);
    }

    /// Serialize and transmit one frame. Does not wait for acknowledgment.
    pub fn send_message(&self, message: &ClientMessage) -> Result<(), ClientError> {
        let socket = self.socket.borrow();
        let Some(active) = socket.as_ref().filter(|active| active.socket.is_open()) else {
            tracing::warn!("WebSocket is not connected; dropping outbound {:?}", message);
            return Err(ClientError::NotConnected);
        };

        let text = serde_json::to_string(message)?;
        active.socket.send_text(&text)?;
        tracing::debug!("Message sent: {}", text);
        Ok(())
    }

    pub fn register_handler<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&ServerEvent) + 'static,
    {
        let id = self.handlers.borrow_mut().register(kind, Rc::new(handler));
        Subscription::new(&self.handlers, kind, id)
    }

    /// Observe connected/disconnected transitions.
    pub fn on_status_change<F>(&self, listener: F)
    where
        F: Fn(bool) + 'static,
    {
        self.status_listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Entry point for socket lifecycle events reported by the connector.
    pub fn handle_socket_event(&self, id: ConnectionId, event: SocketEvent) {
        if !self.is_current(id) {
            tracing::debug!("Ignoring {:?} from stale connection {:?}", event, id);
            return;
        }

        match event {
            SocketEvent::Opened => self.on_open(),
            SocketEvent::Message(text) => self.on_message(&text),
            SocketEvent::Error(message) => self.on_error(&message),
            SocketEvent::Closed { code, reason } => self.on_close(code, &reason),
        }
    }

    fn on_open(&self) {
        tracing::info!("WebSocket connected (session {})", self.session_id);
        self.connecting.set(false);
        self.cancel_reconnect();
        self.reconnect_attempts.set(0);
        self.set_connected(true);
        self.start_keepalive();
    }

    fn on_error(&self, message: &str) {
        tracing::error!("WebSocket error: {}", message);
        self.connecting.set(false);
        self.set_connected(false);
    }

    fn on_close(&self, code: u16, reason: &str) {
        tracing::info!(code, reason, "WebSocket disconnected");
        self.socket.borrow_mut().take();
        self.connecting.set(false);
        self.cancel_keepalive();
        self.set_connected(false);

        if !is_normal_closure(code) {
            self.schedule_reconnect();
        }
    }

    fn on_message(&self, text: &str) {
        match protocol::decode(text) {
            Ok(ServerEvent::Heartbeat) => {
                if let Err(e) = self.send_message(&ClientMessage::Pong) {
                    tracing::warn!("Failed to answer heartbeat: {}", e);
                }
            }
            Ok(event) => {
                let kind = event.kind();
                let invoked = registry::dispatch(&self.handlers, &event);
                tracing::debug!("Dispatched {} to {} handler(s)", kind, invoked);
            }
            Err(DecodeError::UnknownType(tag)) => {
                tracing::debug!("Ignoring unknown message type: {}", tag);
            }
            Err(e) => {
                tracing::warn!("Dropping inbound frame: {}", e);
            }
        }
    }

    fn set_connected(&self, connected: bool) {
        if self.connected.replace(connected) == connected {
            return;
        }
        let listeners = self.status_listeners.borrow().clone();
        for listener in listeners {
            listener(connected);
        }
    }

    fn schedule_reconnect(&self) {
        self.cancel_reconnect();
        let attempt = self.reconnect_attempts.get() + 1;
        self.reconnect_attempts.set(attempt);

        let delay = self.config.reconnect_delay;
        tracing::info!(
            "Reconnecting in {} ms (attempt {})",
            delay.as_millis(),
            attempt
        );

        let this = self.this.clone();
        let handle = self.scheduler.schedule(
            delay,
            Box::new(move || {
                let Some(manager) = this.upgrade() else {
                    return;
                };
                manager.reconnect_timer.borrow_mut().take();
                tracing::info!("Attempting to reconnect...");
                manager.connect();
            }),
        );
        *self.reconnect_timer.borrow_mut() = Some(handle);
    }

    fn cancel_reconnect(&self) {
        let pending = self.reconnect_timer.borrow_mut().take();
        if let Some(handle) = pending {
            self.scheduler.cancel(handle);
        }
    }

    fn start_keepalive(&self) {
        let Some(interval) = self.config.keepalive_interval else {
            return;
        };
        self.cancel_keepalive();

        let this = self.this.clone();
        let handle = self.scheduler.schedule(
            interval,
            Box::new(move || {
                let Some(manager) = this.upgrade() else {
                    return;
                };
                manager.keepalive_timer.borrow_mut().take();
                if !manager.socket_is_open() {
                    return;
                }
                if let Err(e) = manager.send_message(&ClientMessage::Ping) {
                    tracing::warn!("Keep-alive ping failed: {}", e);
                    return;
                }
                manager.start_keepalive();
            }),
        );
        *self.keepalive_timer.borrow_mut() = Some(handle);
    }

    fn cancel_keepalive(&self) {
        let pending = self.keepalive_timer.borrow_mut().take();
        if let Some(handle) = pending {
            self.scheduler.cancel(handle);
        }
    }
}

impl<C: Connector, S: Scheduler> Drop for ConnectionManager<C, S> {
    fn drop(&mut self) {
        for timer in [self.reconnect_timer.get_mut().take(), self.keepalive_timer.get_mut().take()]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel(timer);
        }
        if let Some(active) = self.socket.get_mut().take() {
            active.socket.close(CLOSE_NORMAL, "Client dropped");
        }
    }
}
