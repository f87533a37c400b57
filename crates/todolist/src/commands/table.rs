use std::borrow::Cow;
use std::io::{self, Write};

use todolist_core::{Status, Task};
use unicode_segmentation::UnicodeSegmentation;

const DESCRIPTION_WIDTH: usize = 48;

pub(super) fn render_task_table(tasks: &[Task], out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "ID | Status | Due | Priority | Description")?;
    writeln!(out, "-- | ------ | --- | -------- | -----------")?;

    for task in tasks {
        let description = if task.description.trim().is_empty() {
            Cow::Borrowed("-")
        } else {
            truncate_with_ellipsis(&task.description, DESCRIPTION_WIDTH)
        };
        writeln!(
            out,
            "{} | {}{} | {} {} | {} | {}",
            task.id.short(),
            task.status,
            status_marker(task.status),
            task.date,
            task.time,
            task.priority,
            description
        )?;
    }
    Ok(())
}

pub(super) fn truncate_with_ellipsis(input: &str, max_graphemes: usize) -> Cow<'_, str> {
    const ELLIPSIS: &str = "...";
    const ELLIPSIS_GRAPHEMES: usize = 3;

    if max_graphemes == 0 {
        return Cow::Owned(String::new());
    }

    let grapheme_count = UnicodeSegmentation::graphemes(input, true).count();
    if grapheme_count <= max_graphemes {
        return Cow::Borrowed(input);
    }

    if max_graphemes <= ELLIPSIS_GRAPHEMES {
        let truncated: String = UnicodeSegmentation::graphemes(input, true)
            .take(max_graphemes)
            .collect();
        return Cow::Owned(truncated);
    }

    let keep = max_graphemes - ELLIPSIS_GRAPHEMES;
    let mut truncated: String = UnicodeSegmentation::graphemes(input, true).take(keep).collect();
    truncated.push_str(ELLIPSIS);
    Cow::Owned(truncated)
}

const fn status_marker(status: Status) -> &'static str {
    match status {
        Status::Completed => " ✓",
        Status::Overdue => " !",
        Status::Pending => "",
    }
}
