//! Preview server for blockyard catalogs.
//!
//! Renders catalog pages on request from the current manifest snapshot and
//! pushes reload notifications over a WebSocket when the manifest or block
//! sources change.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{mount_path, router, DevServer, DevServerConfig, ServerError, ServerState};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{ReloadHub, ReloadMessage};
