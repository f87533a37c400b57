//! Card markup for a projected task list.

use std::fmt::Write as _;

use todolist_core::{Status, Task};

/// Header background class for a status.
#[must_use]
pub const fn status_class(status: Status) -> &'static str {
    match status {
        Status::Completed => "bg-success",
        Status::Overdue => "bg-danger",
        Status::Pending => "bg-warning",
    }
}

/// Render every task as a card, in the given order.
#[must_use]
pub fn render_cards(tasks: &[Task]) -> String {
    tasks.iter().map(render_card).collect()
}

/// Render a single task card.
///
/// Action buttons carry the task identifier, never the card position.
#[must_use]
pub fn render_card(task: &Task) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        concat!(
            "<div class=\"col-md-4\">\n",
            "  <div class=\"card\">\n",
            "    <div class=\"card-header text-white {class}\">{status}</div>\n",
            "    <div class=\"card-body\">\n",
            "      <h5 class=\"card-title\">{description}</h5>\n",
            "      <p class=\"card-text\">{date} {time}<br>Priority: {priority}</p>\n",
            "      <button class=\"btn btn-success btn-sm me-2\" data-action=\"toggle\" data-task-id=\"{id}\">&#10004;</button>\n",
            "      <button class=\"btn btn-danger btn-sm\" data-action=\"delete\" data-task-id=\"{id}\">&#128465;</button>\n",
            "    </div>\n",
            "  </div>\n",
            "</div>\n",
        ),
        class = status_class(task.status),
        status = task.status,
        description = escape_html(&task.description),
        date = escape_html(&task.date),
        time = escape_html(&task.time),
        priority = task.priority,
        id = task.id,
    );
    out
}

/// Escape text for inclusion in element content or a quoted attribute.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
