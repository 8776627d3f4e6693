//! In-memory transport fakes shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

use mas_client::{ClientConfig, ClientError, ConnectionId, ConnectionManager, Connector, Scheduler, Socket, SocketEvent};
use serde_json::Value;

pub type TestManager = ConnectionManager<FakeConnector, FakeScheduler>;

pub const SESSION_ID: &str = "session-under-test";

pub fn test_config() -> ClientConfig {
    ClientConfig::with_api_base("http://localhost:8000")
}

// ─── Sockets ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct SocketState {
    url: String,
    open: bool,
    reject_sends: bool,
    sent: Vec<String>,
    closed: Option<(u16, String)>,
}

#[derive(Default)]
struct NetworkState {
    order: Vec<ConnectionId>,
    sockets: HashMap<ConnectionId, SocketState>,
    fail_next_open: bool,
}

/// Records every socket a connector opened and every frame sent on it.
#[derive(Clone, Default)]
pub struct FakeNetwork(Rc<RefCell<NetworkState>>);

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connector(&self) -> FakeConnector {
        FakeConnector(self.clone())
    }

    pub fn open_count(&self) -> usize {
        self.0.borrow().order.len()
    }

    pub fn last_id(&self) -> Option<ConnectionId> {
        self.0.borrow().order.last().copied()
    }

    pub fn url(&self, id: ConnectionId) -> String {
        self.0.borrow().sockets[&id].url.clone()
    }

    /// Complete the handshake for `id` on the fake server side.
    pub fn accept(&self, id: ConnectionId) {
        if let Some(socket) = self.0.borrow_mut().sockets.get_mut(&id) {
            socket.open = true;
        }
    }

    /// Drop the connection from the server side without telling the client.
    pub fn sever(&self, id: ConnectionId) {
        if let Some(socket) = self.0.borrow_mut().sockets.get_mut(&id) {
            socket.open = false;
        }
    }

    /// Keep `id` open but fail every send on it.
    pub fn reject_sends(&self, id: ConnectionId) {
        if let Some(socket) = self.0.borrow_mut().sockets.get_mut(&id) {
            socket.reject_sends = true;
        }
    }

    pub fn fail_next_open(&self) {
        self.0.borrow_mut().fail_next_open = true;
    }

    pub fn sent(&self, id: ConnectionId) -> Vec<String> {
        self.0.borrow().sockets[&id].sent.clone()
    }

    pub fn sent_json(&self, id: ConnectionId) -> Vec<Value> {
        self.sent(id)
            .iter()
            .map(|text| serde_json::from_str(text).expect("client sent invalid JSON"))
            .collect()
    }

    pub fn closed_with(&self, id: ConnectionId) -> Option<(u16, String)> {
        self.0.borrow().sockets[&id].closed.clone()
    }
}

pub struct FakeConnector(FakeNetwork);

impl Connector for FakeConnector {
    type Socket = FakeSocket;

    fn open(&self, url: &str, id: ConnectionId) -> Result<FakeSocket, ClientError> {
        let mut state = (self.0).0.borrow_mut();
        if std::mem::take(&mut state.fail_next_open) {
            return Err(ClientError::Transport("connection refused".to_string()));
        }
        state.order.push(id);
        state.sockets.insert(
            id,
            SocketState {
                url: url.to_string(),
                ..SocketState::default()
            },
        );
        Ok(FakeSocket {
            id,
            network: self.0.clone(),
        })
    }
}

pub struct FakeSocket {
    id: ConnectionId,
    network: FakeNetwork,
}

impl Socket for FakeSocket {
    fn is_open(&self) -> bool {
        let state = self.network.0.borrow();
        state.sockets[&self.id].open
    }

    fn send_text(&self, text: &str) -> Result<(), ClientError> {
        let mut state = self.network.0.borrow_mut();
        let socket = state
            .sockets
            .get_mut(&self.id)
            .ok_or_else(|| ClientError::Transport("unknown socket".to_string()))?;
        if !socket.open {
            return Err(ClientError::Transport("socket closed".to_string()));
        }
        if socket.reject_sends {
            return Err(ClientError::Transport("send buffer full".to_string()));
        }
        socket.sent.push(text.to_string());
        Ok(())
    }

    fn close(&self, code: u16, reason: &str) {
        let mut state = self.network.0.borrow_mut();
        if let Some(socket) = state.sockets.get_mut(&self.id) {
            socket.open = false;
            socket.closed = Some((code, reason.to_string()));
        }
    }
}

// ─── Timers ─────────────────────────────────────────────────────────────────

type Task = Box<dyn FnOnce()>;

#[derive(Default)]
struct TimerState {
    next_handle: u64,
    pending: BTreeMap<u64, (Duration, Task)>,
}

/// Manual clock: timers run only when a test fires them.
#[derive(Clone, Default)]
pub struct FakeScheduler(Rc<RefCell<TimerState>>);

impl FakeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_count(&self) -> usize {
        self.0.borrow().pending.len()
    }

    pub fn pending_delays(&self) -> Vec<Duration> {
        self.0.borrow().pending.values().map(|(delay, _)| *delay).collect()
    }

    /// Run every timer pending right now. Timers scheduled by those tasks stay
    /// pending. Returns how many ran.
    pub fn fire_pending(&self) -> usize {
        let due = std::mem::take(&mut self.0.borrow_mut().pending);
        let count = due.len();
        for (_, (_, task)) in due {
            task();
        }
        count
    }
}

impl Scheduler for FakeScheduler {
    type Handle = u64;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> u64 {
        let mut state = self.0.borrow_mut();
        state.next_handle += 1;
        let handle = state.next_handle;
        state.pending.insert(handle, (delay, task));
        handle
    }

    fn cancel(&self, handle: u64) {
        self.0.borrow_mut().pending.remove(&handle);
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

pub struct Rig {
    pub network: FakeNetwork,
    pub timers: FakeScheduler,
    pub manager: Rc<TestManager>,
}

impl Rig {
    pub fn new(config: ClientConfig) -> Self {
        let network = FakeNetwork::new();
        let timers = FakeScheduler::new();
        let manager = ConnectionManager::new(config, SESSION_ID, network.connector(), timers.clone());
        Self {
            network,
            timers,
            manager,
        }
    }

    /// Connect and complete the handshake.
    pub fn establish(&self) -> ConnectionId {
        self.manager.connect();
        let id = self.network.last_id().expect("connect() opened no socket");
        open(&self.manager, &self.network, id);
        id
    }
}

pub fn open(manager: &TestManager, network: &FakeNetwork, id: ConnectionId) {
    network.accept(id);
    manager.handle_socket_event(id, SocketEvent::Opened);
}

pub fn deliver(manager: &TestManager, id: ConnectionId, frame: Value) {
    manager.handle_socket_event(id, SocketEvent::Message(frame.to_string()));
}

pub fn close(manager: &TestManager, network: &FakeNetwork, id: ConnectionId, code: u16) {
    network.sever(id);
    manager.handle_socket_event(
        id,
        SocketEvent::Closed {
            code,
            reason: String::new(),
        },
    );
}
