// SPDX-License-Identifier: MIT

//! Shared workflow state and the per-field merge rules
//!
//! State flows through the graph as a typed struct. Nodes never mutate it
//! directly; they return a [`StateUpdate`] and the executor folds it in with
//! [`WorkflowState::apply`]. The merge rule for every field is the same:
//! an incoming value replaces the previous one, an absent value keeps it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of collector agents, in execution priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Compliance,
    Issue,
    Scan,
}

impl AgentKind {
    /// Fixed execution order. Selected agents always run in this order, no
    /// matter how the planner listed them.
    pub const PRIORITY: [AgentKind; 3] = [AgentKind::Compliance, AgentKind::Issue, AgentKind::Scan];

    /// Wire tag used in routing decisions and logs.
    pub fn tag(&self) -> &'static str {
        match self {
            AgentKind::Compliance => "compliance",
            AgentKind::Issue => "issue",
            AgentKind::Scan => "scan",
        }
    }

    /// Human-facing name used in report fragments.
    pub fn title(&self) -> &'static str {
        match self {
            AgentKind::Compliance => "Compliance",
            AgentKind::Issue => "Issue",
            AgentKind::Scan => "Scan",
        }
    }

    /// What this agent's items are called in its report line.
    pub fn items_noun(&self) -> &'static str {
        match self {
            AgentKind::Compliance => "compliance items",
            AgentKind::Issue => "tracked issues",
            AgentKind::Scan => "security scan findings",
        }
    }

    /// Parse a wire tag. Anything outside the closed set is rejected, so a
    /// routing decision can never smuggle in an unknown agent.
    pub fn parse_tag(tag: &str) -> Option<AgentKind> {
        match tag.trim().to_lowercase().as_str() {
            "compliance" => Some(AgentKind::Compliance),
            "issue" => Some(AgentKind::Issue),
            "scan" => Some(AgentKind::Scan),
            _ => None,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One unit of tracked work, as persisted in the task store.
///
/// All fields are plain strings; absence is the empty string. Identity for
/// deduplication is the `(app_id, task)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub app_id: String,
    pub task_type: String,
    pub task_sub_type: String,
    pub task: String,
    pub due_date: String,
    pub parent_ticket: String,
    pub ticket: String,
    pub status: String,
    pub more_details: String,
}

impl TaskItem {
    /// Dedup identity.
    pub fn key(&self) -> (&str, &str) {
        (&self.app_id, &self.task)
    }
}

/// The shared state one workflow run threads through its nodes.
///
/// `user_query` and `app_id` are inputs, fixed at construction; they do not
/// appear in [`StateUpdate`], so no node can overwrite them.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub user_query: String,
    pub app_id: String,
    /// Written once by the planner. Empty until then.
    pub agents_to_invoke: Vec<AgentKind>,
    pub compliance_response: Option<String>,
    pub compliance_items: Option<Vec<TaskItem>>,
    pub issue_response: Option<String>,
    pub issue_items: Option<Vec<TaskItem>>,
    pub scan_response: Option<String>,
    pub scan_items: Option<Vec<TaskItem>>,
    pub final_summary: Option<String>,
    pub all_items: Option<Vec<TaskItem>>,
}

impl WorkflowState {
    /// Fresh state for one run.
    pub fn new(user_query: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            user_query: user_query.into(),
            app_id: app_id.into(),
            agents_to_invoke: Vec::new(),
            compliance_response: None,
            compliance_items: None,
            issue_response: None,
            issue_items: None,
            scan_response: None,
            scan_items: None,
            final_summary: None,
            all_items: None,
        }
    }

    /// Fold a node's partial update into the state. Fields the update left
    /// as `None` keep their previous value; collections are replaced whole,
    /// never element-merged.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(v) = update.agents_to_invoke {
            self.agents_to_invoke = v;
        }
        if let Some(v) = update.compliance_response {
            self.compliance_response = Some(v);
        }
        if let Some(v) = update.compliance_items {
            self.compliance_items = Some(v);
        }
        if let Some(v) = update.issue_response {
            self.issue_response = Some(v);
        }
        if let Some(v) = update.issue_items {
            self.issue_items = Some(v);
        }
        if let Some(v) = update.scan_response {
            self.scan_response = Some(v);
        }
        if let Some(v) = update.scan_items {
            self.scan_items = Some(v);
        }
        if let Some(v) = update.final_summary {
            self.final_summary = Some(v);
        }
        if let Some(v) = update.all_items {
            self.all_items = Some(v);
        }
    }

    /// Report fragment produced by the given agent, if it ran.
    pub fn response_for(&self, kind: AgentKind) -> Option<&str> {
        match kind {
            AgentKind::Compliance => self.compliance_response.as_deref(),
            AgentKind::Issue => self.issue_response.as_deref(),
            AgentKind::Scan => self.scan_response.as_deref(),
        }
    }

    /// Items extracted by the given agent, if it ran.
    pub fn items_for(&self, kind: AgentKind) -> Option<&[TaskItem]> {
        match kind {
            AgentKind::Compliance => self.compliance_items.as_deref(),
            AgentKind::Issue => self.issue_items.as_deref(),
            AgentKind::Scan => self.scan_items.as_deref(),
        }
    }
}

/// Partial state update returned by a node. Every writable field is optional;
/// `None` means "leave the previous value alone".
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub agents_to_invoke: Option<Vec<AgentKind>>,
    pub compliance_response: Option<String>,
    pub compliance_items: Option<Vec<TaskItem>>,
    pub issue_response: Option<String>,
    pub issue_items: Option<Vec<TaskItem>>,
    pub scan_response: Option<String>,
    pub scan_items: Option<Vec<TaskItem>>,
    pub final_summary: Option<String>,
    pub all_items: Option<Vec<TaskItem>>,
}

impl StateUpdate {
    /// Update carrying one agent's extraction result and report fragment.
    pub fn for_agent(kind: AgentKind, items: Vec<TaskItem>, response: String) -> Self {
        let mut update = StateUpdate::default();
        match kind {
            AgentKind::Compliance => {
                update.compliance_items = Some(items);
                update.compliance_response = Some(response);
            }
            AgentKind::Issue => {
                update.issue_items = Some(items);
                update.issue_response = Some(response);
            }
            AgentKind::Scan => {
                update.scan_items = Some(items);
                update.scan_response = Some(response);
            }
        }
        update
    }
}
