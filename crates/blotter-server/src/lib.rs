//! Development server with live reload for blotter blogs.
//!
//! Renders the list and detail views straight from the posts directory on
//! every request, and reloads open pages when posts change on disk.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{ReloadHub, ReloadMessage};
