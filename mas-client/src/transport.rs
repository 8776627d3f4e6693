//! Seams between the connection manager and the host environment.
//!
//! The browser build implements these with `web_sys::WebSocket` and Dioxus
//! tasks; tests implement them with in-memory fakes.

use std::time::Duration;

use crate::error::ClientError;

/// Normal closure codes. Any other close code triggers a reconnect.
pub const CLOSE_NORMAL: u16 = 1000;
pub const CLOSE_GOING_AWAY: u16 = 1001;

pub fn is_normal_closure(code: u16) -> bool {
    code == CLOSE_NORMAL || code == CLOSE_GOING_AWAY
}

/// Identifies one opened socket so late events from a replaced socket can be
/// told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

/// Lifecycle notifications a socket reports back to the manager
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Opened,
    Message(String),
    Error(String),
    Closed { code: u16, reason: String },
}

/// An open (or opening) socket handle
pub trait Socket {
    /// True only once the handshake completed and until close starts.
    fn is_open(&self) -> bool;

    fn send_text(&self, text: &str) -> Result<(), ClientError>;

    fn close(&self, code: u16, reason: &str);
}

/// Opens sockets. The implementation must route the socket's lifecycle back
/// to `ConnectionManager::handle_socket_event` tagged with `id`.
pub trait Connector {
    type Socket: Socket;

    fn open(&self, url: &str, id: ConnectionId) -> Result<Self::Socket, ClientError>;
}

/// One-shot timers
pub trait Scheduler {
    type Handle;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Self::Handle;

    fn cancel(&self, handle: Self::Handle);
}
