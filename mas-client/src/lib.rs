//! MAS Console client core
//!
//! Connection management and state synchronization for the multi-agent chat
//! console. Browser specifics (sockets, timers, local storage) are reached
//! through the traits in [`transport`] and [`session`], so this crate runs
//! natively under `cargo test` as well as inside the WASM app.

pub mod chat;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod export;
pub mod format;
pub mod metrics;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod timeline;
pub mod tracking;
pub mod transport;

pub use chat::ChatStore;
pub use client::{MasClient, StoreChange};
pub use config::ClientConfig;
pub use connection::ConnectionManager;
pub use error::{ClientError, ConfigError, DecodeError};
pub use protocol::{EventKind, ServerEvent};
pub use registry::{HandlerId, Subscription};
pub use session::{resolve_session_id, MemoryStorage, SessionStorage, SESSION_STORAGE_KEY};
pub use tracking::AgentTracker;
pub use transport::{ConnectionId, Connector, Scheduler, Socket, SocketEvent};
