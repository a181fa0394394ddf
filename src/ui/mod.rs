//! Interactive UI state: the task form and per-task rows.
//!
//! These are plain state machines. The web layer renders them to HTML and the
//! page script mirrors the same transitions in the browser.

pub mod form;
pub mod row;

pub use form::{FormMode, FormState, Submission, TaskForm};
pub use row::{CONFIRM_DELETE_PROMPT, DeleteState, RowVisual, TaskRow, ToggleState};
