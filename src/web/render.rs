//! HTML rendering for the task board.
//!
//! Fragments are built with `format!` and substituted into the page template.
//! All user-supplied text goes through [`html_escape`].

use super::templates;
use crate::types::{Priority, Task};
use crate::ui::{CONFIRM_DELETE_PROMPT, FormMode, TaskForm, TaskRow};
use crate::view::TaskListModel;

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "badge-low",
        Priority::Medium => "badge-medium",
        Priority::High => "badge-high",
    }
}

/// Full page: header, add-task control and the task list.
pub fn page(add_form: &TaskForm, task_list: &str, notice: Option<&str>) -> String {
    let notice_html = notice
        .map(|n| format!(r#"<div class="message message-error">{}</div>"#, html_escape(n)))
        .unwrap_or_default();

    // The add form starts collapsed unless it has something to show.
    let add_open = if add_form.error().is_some() { " open" } else { "" };

    templates::fill(
        templates::PAGE_TEMPLATE,
        &[
            ("notice", notice_html.as_str()),
            ("add_open", add_open),
            ("add_form", form(add_form, None).as_str()),
            ("task_list", task_list),
            ("confirm_prompt", html_escape(CONFIRM_DELETE_PROMPT).as_str()),
        ],
    )
}

/// The task list: empty state, or pending and completed sections.
///
/// When `edit` is an edit-mode form, the matching row renders it in place.
pub fn task_list(model: &TaskListModel, edit: Option<&TaskForm>) -> String {
    if model.is_empty() {
        return r#"<div class="empty-state">No tasks yet. Add your first task above!</div>"#
            .to_string();
    }

    let edit_id = edit.and_then(|f| match f.mode() {
        FormMode::Edit(id) => Some(id),
        FormMode::Create => None,
    });

    let rows = |tasks: &[Task]| -> String {
        tasks
            .iter()
            .map(|task| {
                let mut row = TaskRow::new(task.clone());
                if let (Some(id), Some(form)) = (edit_id, edit) {
                    if id == task.id {
                        row.edit_with(form.clone());
                    }
                }
                self::row(&row)
            })
            .collect()
    };

    let mut html = String::from(r#"<div class="task-sections">"#);
    for (heading, tasks) in [("Pending Tasks", &model.pending), ("Completed Tasks", &model.completed)] {
        if tasks.is_empty() {
            continue;
        }
        html.push_str(&format!(
            r#"<section><h2>{} ({})</h2><div class="task-rows">{}</div></section>"#,
            heading,
            tasks.len(),
            rows(tasks.as_slice())
        ));
    }
    html.push_str("</div>");
    html
}

/// One task row, or its edit form when the row is in edit mode.
pub fn row(row: &TaskRow) -> String {
    let task = row.task();

    if let Some(edit_form) = row.edit_form() {
        return format!(
            r#"<div class="card task editing" id="task-{id}">
  <div class="card-header"><h3>Edit Task</h3><a class="link" href="/">Cancel</a></div>
  {form}
</div>"#,
            id = task.id,
            form = form(edit_form, Some(task.id)),
        );
    }

    let visual = row.visual();
    let mut classes = String::from("card task");
    if visual.dimmed {
        classes.push_str(" done");
    }

    let description = task
        .description
        .as_deref()
        .map(|d| format!(r#"<p class="task-description">{}</p>"#, html_escape(d)))
        .unwrap_or_default();

    let notice = row
        .notice()
        .map(|n| format!(r#"<p class="task-notice">{}</p>"#, html_escape(n)))
        .unwrap_or_default();

    let (delete_label, delete_disabled) = if row.is_deleting() {
        ("Deleting...", " disabled")
    } else {
        ("Delete", "")
    };

    format!(
        r#"<div class="{classes}" id="task-{id}">
  <form method="post" action="/tasks/{id}/toggle" class="toggle-form">
    <input type="checkbox" class="task-toggle" aria-label="Completed"{checked}>
  </form>
  <div class="task-body">
    <div class="task-heading">
      <h3 class="task-title">{title}</h3>
      <span class="badge {badge}">{priority}</span>
    </div>
    {description}
    <p class="task-meta">Created: {created}</p>
    {notice}
  </div>
  <div class="task-actions">
    <a class="link" href="/tasks/{id}/edit">Edit</a>
    <form method="post" action="/tasks/{id}/delete" class="delete-form">
      <input type="hidden" name="confirm" value="yes">
      <button type="submit" class="link link-danger"{delete_disabled}>{delete_label}</button>
    </form>
  </div>
</div>"#,
        id = task.id,
        checked = if visual.checked { " checked" } else { "" },
        title = html_escape(&task.title),
        badge = priority_class(task.priority),
        priority = task.priority,
        created = task.created_date(),
    )
}

/// The task form. `task_id` selects the update action instead of create.
pub fn form(form: &TaskForm, task_id: Option<i64>) -> String {
    let action = match task_id {
        Some(id) => format!("/tasks/{}", id),
        None => "/tasks".to_string(),
    };

    let error = form
        .error()
        .map(|e| format!(r#"<div class="message message-error">{}</div>"#, html_escape(e)))
        .unwrap_or_default();

    let values = form.values();
    let selected = Priority::from_field(values.priority.as_deref()).unwrap_or_default();
    let options: String = Priority::ALL
        .iter()
        .map(|p| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                p,
                if *p == selected { " selected" } else { "" },
                p.label()
            )
        })
        .collect();

    let disabled = if form.is_submitting() { " disabled" } else { "" };

    format!(
        r#"<form method="post" action="{action}" class="task-form">
  {error}
  <label>Title *
    <input type="text" name="title" value="{title}" required placeholder="Enter task title"{disabled}>
  </label>
  <label>Description
    <textarea name="description" rows="3" placeholder="Enter task description (optional)"{disabled}>{description}</textarea>
  </label>
  <label>Priority
    <select name="priority"{disabled}>{options}</select>
  </label>
  <button type="submit" class="button"{disabled}>{label}</button>
</form>"#,
        title = html_escape(&values.title),
        description = html_escape(values.description.as_deref().unwrap_or("")),
        label = form.submit_label(),
    )
}
