pub mod api;
pub mod components;
pub mod download;
pub mod state;
pub mod transport;

pub use api::*;
pub use components::*;
pub use state::{use_console, use_console_provider, Console, ConsoleClient};
pub use transport::{BrowserSocket, DioxusScheduler, LocalStorage, WebSocketConnector};
