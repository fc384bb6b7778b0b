//! Deterministic HTML table extractor
//!
//! Last-resort extraction used when the model is unavailable or returned
//! nothing usable. Walks the fixed `<tr>`/`<td>` structure of the source
//! reports: five-cell rows are compliance items (last cell the parent
//! ticket), seven-cell rows carry ticket, status and details. Header rows
//! use `<th>` and fall out naturally; rows with any other cell count are
//! skipped. Lower hit rate than the model, but always terminates.

use crate::workflow::state::{AgentKind, TaskItem};

/// Extract items from a raw report document without the model.
pub fn extract_items(html: &str, kind: AgentKind, app_id: &str) -> Vec<TaskItem> {
    table_rows(html)
        .into_iter()
        .filter_map(|cells| item_from_cells(cells, kind, app_id))
        .collect()
}

fn table_rows(html: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find("<tr>") {
        let after = &rest[start + 4..];
        let Some(end) = after.find("</tr>") else { break };
        rows.push(row_cells(&after[..end]));
        rest = &after[end + 5..];
    }
    rows
}

fn row_cells(row: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut rest = row;
    while let Some(start) = rest.find("<td>") {
        let after = &rest[start + 4..];
        // Cell text may contain a bare '<'; only the closing tag ends it.
        let Some(end) = after.find("</td>") else { break };
        cells.push(after[..end].trim().to_string());
        rest = &after[end + 5..];
    }
    cells
}

fn item_from_cells(cells: Vec<String>, kind: AgentKind, app_id: &str) -> Option<TaskItem> {
    match kind {
        AgentKind::Compliance => {
            let [task_type, task_sub_type, task, due_date, parent_ticket]: [String; 5] =
                cells.try_into().ok()?;
            Some(TaskItem {
                app_id: app_id.to_string(),
                task_type,
                task_sub_type,
                task,
                due_date,
                parent_ticket,
                ..Default::default()
            })
        }
        AgentKind::Issue | AgentKind::Scan => {
            let [task_type, task_sub_type, task, due_date, ticket, status, more_details]: [String;
                7] = cells.try_into().ok()?;
            Some(TaskItem {
                app_id: app_id.to_string(),
                task_type,
                task_sub_type,
                task,
                due_date,
                ticket,
                status,
                more_details,
                ..Default::default()
            })
        }
    }
}
