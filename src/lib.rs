//! Task board library.
//!
//! A small task tracker: SQLite-backed storage behind a validating service
//! layer, with a server-rendered web UI.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod invalidation;
pub mod logging;
pub mod service;
pub mod store;
pub mod types;
pub mod ui;
pub mod view;
pub mod web;

pub use error::{ErrorCode, ErrorKind, ServiceError, ServiceResult};
pub use service::TaskService;
pub use types::{Priority, Task, TaskId, TaskInput};
