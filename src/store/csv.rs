//! Row codec for the task table
//!
//! One fixed 9-column layout shared by the durable store file, the model's
//! extraction output and the report fragments. Quoting is RFC4180-style:
//! fields containing the delimiter, a quote or a newline are wrapped in
//! quotes, embedded quotes are doubled.

use crate::workflow::state::TaskItem;

/// Fixed column order. Everything that renders or parses rows agrees on it.
pub const HEADER: &str =
    "app_id,task_type,task_sub_type,task,due_date,parent_ticket,ticket,status,more_details";

pub const FIELD_COUNT: usize = 9;

fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render one item as a single row.
pub fn render_line(item: &TaskItem) -> String {
    [
        &item.app_id,
        &item.task_type,
        &item.task_sub_type,
        &item.task,
        &item.due_date,
        &item.parent_ticket,
        &item.ticket,
        &item.status,
        &item.more_details,
    ]
    .iter()
    .map(|field| escape_field(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// Render a full table: header line plus one row per item.
pub fn render_table(items: &[TaskItem]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for item in items {
        out.push_str(&render_line(item));
        out.push('\n');
    }
    out
}

/// Split one row into fields, honoring quoting. A doubled quote inside a
/// quoted field is a literal quote.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

fn item_from_fields(mut fields: Vec<String>) -> TaskItem {
    fields.resize(FIELD_COUNT, String::new());
    let mut it = fields.into_iter();
    // Order matches HEADER.
    TaskItem {
        app_id: it.next().unwrap_or_default(),
        task_type: it.next().unwrap_or_default(),
        task_sub_type: it.next().unwrap_or_default(),
        task: it.next().unwrap_or_default(),
        due_date: it.next().unwrap_or_default(),
        parent_ticket: it.next().unwrap_or_default(),
        ticket: it.next().unwrap_or_default(),
        status: it.next().unwrap_or_default(),
        more_details: it.next().unwrap_or_default(),
    }
}

/// Parse one durable store row. Rows with fewer than 9 fields are rejected;
/// extra fields are ignored.
pub fn parse_store_row(line: &str) -> Option<TaskItem> {
    let fields = split_line(line);
    if fields.len() < FIELD_COUNT {
        return None;
    }
    Some(item_from_fields(fields))
}

/// Parse model extraction output into items. Tolerant by design: code fences
/// and echoed header lines are dropped, short rows are padded with empty
/// fields, and a missing app id is filled from the run's `app_id`. A row
/// without a task is unusable (item identity is the `(app_id, task)` pair),
/// so prose answers parse to zero rows and the caller can fall back.
pub fn parse_model_rows(text: &str, app_id: &str) -> Vec<TaskItem> {
    let mut items = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("```") {
            continue;
        }
        let fields: Vec<String> = split_line(line)
            .into_iter()
            .map(|f| f.trim().to_string())
            .collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        // Header echo from the model.
        if fields[0].eq_ignore_ascii_case("app_id") {
            continue;
        }
        let mut item = item_from_fields(fields);
        if item.task.is_empty() {
            continue;
        }
        if item.app_id.is_empty() {
            item.app_id = app_id.to_string();
        }
        items.push(item);
    }
    items
}
