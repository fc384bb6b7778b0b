// SPDX-License-Identifier: MIT

//! Durable task store
//!
//! All collected [`TaskItem`]s live in one flat text table (see [`csv`] for
//! the format). Rows are keyed by `(app_id, task)`; merging an already-known
//! item only fills in ticket, status and details where the stored row has
//! none, so repeating a merge is a no-op. Load-merge-persist runs under an
//! internal lock: one writer per process, cross-process exclusion is the
//! caller's problem.

pub mod csv;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, warn};

use crate::error::StoreError;
use crate::workflow::state::TaskItem;

/// Counts returned by [`TaskStore::merge`], for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub added: usize,
    pub updated: usize,
}

/// File-backed store of every task item collected across runs.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All rows currently persisted. A missing file is the empty set.
    pub fn load(&self) -> Result<Vec<TaskItem>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read_rows()
    }

    /// Merge a batch of freshly extracted items into the durable row set.
    ///
    /// Unknown `(app_id, task)` pairs are appended verbatim. For known pairs
    /// only `ticket`, `status` and `more_details` are filled, and each only
    /// when the stored value is empty and the incoming one is not; every
    /// other stored field keeps its original value. The whole row set is
    /// rewritten on success.
    pub fn merge(&self, incoming: &[TaskItem]) -> Result<MergeOutcome, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut rows = self.read_rows()?;
        let mut outcome = MergeOutcome::default();

        for item in incoming {
            match rows.iter_mut().find(|row| row.key() == item.key()) {
                Some(existing) => {
                    let mut changed = fill(&mut existing.ticket, &item.ticket);
                    changed |= fill(&mut existing.status, &item.status);
                    changed |= fill(&mut existing.more_details, &item.more_details);
                    if changed {
                        outcome.updated += 1;
                    }
                }
                None => {
                    rows.push(item.clone());
                    outcome.added += 1;
                }
            }
        }

        self.write_rows(&rows)?;
        debug!(
            "Task store merge: {} added, {} updated ({} rows total)",
            outcome.added,
            outcome.updated,
            rows.len()
        );
        Ok(outcome)
    }

    fn read_rows(&self) -> Result<Vec<TaskItem>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };

        let mut rows = Vec::new();
        // First line is the header.
        for line in content.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            match csv::parse_store_row(line) {
                Some(item) => rows.push(item),
                None => warn!("Skipping malformed store row: {}", line),
            }
        }
        Ok(rows)
    }

    fn write_rows(&self, rows: &[TaskItem]) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        fs::write(&self.path, csv::render_table(rows)).map_err(write_err)
    }
}

fn fill(existing: &mut String, incoming: &str) -> bool {
    if existing.is_empty() && !incoming.is_empty() {
        *existing = incoming.to_string();
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn item(app_id: &str, task: &str) -> TaskItem {
        TaskItem {
            app_id: app_id.to_string(),
            task_type: "Security".to_string(),
            task: task.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("task_items.csv"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_merge_adds_and_persists() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("task_items.csv"));

        let outcome = store
            .merge(&[item("APP-1", "Patch TLS"), item("APP-1", "Rotate keys")])
            .unwrap();
        assert_eq!(
            outcome,
            MergeOutcome {
                added: 2,
                updated: 0
            }
        );

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with(csv::HEADER));
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("task_items.csv"));
        let batch = vec![
            TaskItem {
                ticket: "SEC-1".to_string(),
                status: "Open".to_string(),
                more_details: "details".to_string(),
                ..item("APP-1", "Patch TLS")
            },
            item("APP-1", "Rotate keys"),
        ];

        let first = store.merge(&batch).unwrap();
        assert_eq!(
            first,
            MergeOutcome {
                added: 2,
                updated: 0
            }
        );

        let second = store.merge(&batch).unwrap();
        assert_eq!(
            second,
            MergeOutcome {
                added: 0,
                updated: 0
            }
        );
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn test_merge_fills_only_empty_fields() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("task_items.csv"));

        let stored = TaskItem {
            due_date: "2024-01-01".to_string(),
            ..item("APP-1", "Patch TLS")
        };
        store.merge(&[stored]).unwrap();

        // Same identity, different everything else.
        let incoming = TaskItem {
            task_type: "Compliance".to_string(),
            due_date: "2030-12-31".to_string(),
            ticket: "SEC-9".to_string(),
            status: "Open".to_string(),
            ..item("APP-1", "Patch TLS")
        };
        let outcome = store.merge(&[incoming]).unwrap();
        assert_eq!(
            outcome,
            MergeOutcome {
                added: 0,
                updated: 1
            }
        );

        let rows = store.load().unwrap();
        assert_eq!(rows.len(), 1);
        // Fillable fields were empty, so they took the incoming values.
        assert_eq!(rows[0].ticket, "SEC-9");
        assert_eq!(rows[0].status, "Open");
        // Non-fillable fields keep what was stored first.
        assert_eq!(rows[0].task_type, "Security");
        assert_eq!(rows[0].due_date, "2024-01-01");
    }

    #[test]
    fn test_merge_does_not_overwrite_populated_fields() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("task_items.csv"));

        store
            .merge(&[TaskItem {
                status: "Closed".to_string(),
                ..item("APP-1", "Patch TLS")
            }])
            .unwrap();

        let outcome = store
            .merge(&[TaskItem {
                status: "Open".to_string(),
                ..item("APP-1", "Patch TLS")
            }])
            .unwrap();
        assert_eq!(outcome.updated, 0);
        assert_eq!(store.load().unwrap()[0].status, "Closed");
    }

    #[test]
    fn test_load_skips_malformed_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("task_items.csv");
        fs::write(
            &path,
            format!("{}\nAPP-1,a,b,Patch TLS,c,d,e,f,g\nbroken,row\n", csv::HEADER),
        )
        .unwrap();

        let store = TaskStore::new(&path);
        let rows = store.load().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].task, "Patch TLS");
    }

    #[test]
    fn test_quoted_values_survive_persistence() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("task_items.csv"));

        let tricky = TaskItem {
            more_details: "Found in \"auth\", needs review".to_string(),
            ..item("APP-1", "Fix header, injection")
        };
        store.merge(&[tricky.clone()]).unwrap();

        let rows = store.load().unwrap();
        assert_eq!(rows[0].task, tricky.task);
        assert_eq!(rows[0].more_details, tricky.more_details);
    }
}
