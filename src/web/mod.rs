//! Web UI for the task board.
//!
//! Serves the task list page and its form endpoints on a local port.

mod render;
mod server;
pub mod templates;

pub use render::html_escape;
pub use server::{ServerHandle, WebServer, router, start_server};
