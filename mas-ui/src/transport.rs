//! Browser implementations of the client transport seams.
//!
//! Socket callbacks never call into the client directly: they push onto a
//! queue that the console's pump task drains on the Dioxus runtime.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use dioxus::core::Task;
use dioxus::prelude::spawn;
use gloo_timers::future::TimeoutFuture;
use mas_client::{ClientError, ConnectionId, Connector, Scheduler, SessionStorage, Socket, SocketEvent};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

pub type SocketEventQueue = Rc<RefCell<VecDeque<(ConnectionId, SocketEvent)>>>;

fn js_error(context: &str, error: JsValue) -> ClientError {
    ClientError::Transport(format!("{context}: {error:?}"))
}

// ============================================================================
// WebSocket
// ============================================================================

#[derive(Clone, Default)]
pub struct WebSocketConnector {
    queue: SocketEventQueue,
}

impl WebSocketConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every socket event reported since the last drain.
    pub fn drain(&self) -> Vec<(ConnectionId, SocketEvent)> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

impl Connector for WebSocketConnector {
    type Socket = BrowserSocket;

    fn open(&self, url: &str, id: ConnectionId) -> Result<BrowserSocket, ClientError> {
        let ws = WebSocket::new(url).map_err(|e| js_error("Failed to create websocket", e))?;

        let queue = self.queue.clone();
        let on_open = Closure::wrap(Box::new(move |_e: Event| {
            queue.borrow_mut().push_back((id, SocketEvent::Opened));
        }) as Box<dyn FnMut(Event)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        let queue = self.queue.clone();
        let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
            let Ok(text) = e.data().dyn_into::<js_sys::JsString>() else {
                tracing::debug!("Ignoring non-text WebSocket frame");
                return;
            };
            let text = text.as_string().unwrap_or_default();
            queue.borrow_mut().push_back((id, SocketEvent::Message(text)));
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let queue = self.queue.clone();
        let on_error = Closure::wrap(Box::new(move |e: Event| {
            queue
                .borrow_mut()
                .push_back((id, SocketEvent::Error(e.type_())));
        }) as Box<dyn FnMut(Event)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let queue = self.queue.clone();
        let on_close = Closure::wrap(Box::new(move |e: CloseEvent| {
            queue.borrow_mut().push_back((
                id,
                SocketEvent::Closed {
                    code: e.code(),
                    reason: e.reason(),
                },
            ));
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        Ok(BrowserSocket {
            ws,
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
            _on_close: on_close,
        })
    }
}

pub struct BrowserSocket {
    ws: WebSocket,
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl Socket for BrowserSocket {
    fn is_open(&self) -> bool {
        self.ws.ready_state() == WebSocket::OPEN
    }

    fn send_text(&self, text: &str) -> Result<(), ClientError> {
        self.ws
            .send_with_str(text)
            .map_err(|e| js_error("WebSocket send failed", e))
    }

    fn close(&self, code: u16, reason: &str) {
        if let Err(e) = self.ws.close_with_code_and_reason(code, reason) {
            tracing::warn!("WebSocket close failed: {:?}", e);
        }
    }
}

impl Drop for BrowserSocket {
    fn drop(&mut self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        let state = self.ws.ready_state();
        if state == WebSocket::CONNECTING || state == WebSocket::OPEN {
            let _ = self.ws.close();
        }
    }
}

// ============================================================================
// Timers
// ============================================================================

/// One-shot timers as Dioxus tasks; cancelling drops the pending future.
#[derive(Clone, Copy, Default)]
pub struct DioxusScheduler;

impl Scheduler for DioxusScheduler {
    type Handle = Task;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Task {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        spawn(async move {
            TimeoutFuture::new(millis).await;
            task();
        })
    }

    fn cancel(&self, handle: Task) {
        handle.cancel();
    }
}

// ============================================================================
// Local storage
// ============================================================================

#[derive(Clone, Copy, Default)]
pub struct LocalStorage;

fn local_storage() -> Result<web_sys::Storage, ClientError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| ClientError::Storage("localStorage is unavailable".to_string()))
}

impl SessionStorage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        local_storage()?
            .get_item(key)
            .map_err(|e| ClientError::Storage(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|e| ClientError::Storage(format!("{e:?}")))
    }
}
