//! The task-routing graph and its executor
//!
//! A fixed topology: planner first, then the selected collector agents in
//! priority order, then the summarizer. Conditional edges are resolved by
//! [`next_node`], a pure function over the current node and the planner's
//! selection - there is no dispatch table to misconfigure. The executor
//! itself does no I/O; it runs one node at a time, folds each partial
//! update into the state, and stops at the first node error.

use std::sync::Arc;

use log::info;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::RoundupError;
use crate::llm::Model;
use crate::sources::Sources;
use crate::store::TaskStore;
use crate::workflow::collector::Collector;
use crate::workflow::planner::Planner;
use crate::workflow::state::{AgentKind, WorkflowState};
use crate::workflow::summarizer::Summarizer;

/// Nodes of the fixed graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphNode {
    Planner,
    Agent(AgentKind),
    Summarizer,
    End,
}

/// Entry node of every run.
pub fn entry_node() -> GraphNode {
    GraphNode::Planner
}

/// Resolve the edge out of `current`.
///
/// From the planner: the first selected agent in priority order, or the
/// summarizer when none was selected. From an agent: the next selected
/// agent after it in priority order, or the summarizer. Every selected
/// agent runs exactly once and in priority order, no matter how the
/// planner ordered its selection; unselected agents are unreachable.
pub fn next_node(current: GraphNode, agents_to_invoke: &[AgentKind]) -> GraphNode {
    match current {
        GraphNode::Planner => first_selected(agents_to_invoke, None),
        GraphNode::Agent(kind) => first_selected(agents_to_invoke, Some(kind)),
        GraphNode::Summarizer | GraphNode::End => GraphNode::End,
    }
}

fn first_selected(selected: &[AgentKind], after: Option<AgentKind>) -> GraphNode {
    let start = match after {
        None => 0,
        Some(kind) => match AgentKind::PRIORITY.iter().position(|k| *k == kind) {
            Some(index) => index + 1,
            None => AgentKind::PRIORITY.len(),
        },
    };
    AgentKind::PRIORITY[start..]
        .iter()
        .find(|kind| selected.contains(kind))
        .map(|kind| GraphNode::Agent(*kind))
        .unwrap_or(GraphNode::Summarizer)
}

/// The wired-up workflow. All collaborators are injected at construction;
/// nothing is looked up through process-wide state.
pub struct Workflow {
    planner: Planner,
    collectors: [Collector; 3],
    summarizer: Summarizer,
}

impl Workflow {
    pub fn new(model: Arc<dyn Model>, sources: Sources, store: Arc<TaskStore>) -> Self {
        let collectors = AgentKind::PRIORITY.map(|kind| {
            Collector::new(
                kind,
                sources.for_kind(kind),
                Arc::clone(&model),
                Arc::clone(&store),
            )
        });
        Self {
            planner: Planner::new(Arc::clone(&model)),
            collectors,
            summarizer: Summarizer::new(model, store),
        }
    }

    /// Build the initial state for `(user_query, app_id)` and run.
    pub async fn run_query(
        &self,
        user_query: &str,
        app_id: &str,
        cancel: &CancellationToken,
    ) -> Result<WorkflowState, RoundupError> {
        self.run(WorkflowState::new(user_query, app_id), cancel).await
    }

    /// Run the graph to completion and return the final state.
    ///
    /// The initial state must carry a non-empty query and app id and an
    /// empty agent selection. A node error aborts the run as-is; the
    /// executor retries nothing.
    pub async fn run(
        &self,
        mut state: WorkflowState,
        cancel: &CancellationToken,
    ) -> Result<WorkflowState, RoundupError> {
        if state.user_query.trim().is_empty() {
            return Err(RoundupError::invalid_input("user_query must not be empty"));
        }
        if state.app_id.trim().is_empty() {
            return Err(RoundupError::invalid_input("app_id must not be empty"));
        }
        if !state.agents_to_invoke.is_empty() {
            return Err(RoundupError::invalid_input(
                "agents_to_invoke must start empty",
            ));
        }

        let run_id = Uuid::new_v4();
        info!(
            "Workflow {}: starting for app {} (query: {:?})",
            run_id, state.app_id, state.user_query
        );

        let mut current = entry_node();
        loop {
            if cancel.is_cancelled() {
                info!("Workflow {}: cancelled before {:?}", run_id, current);
                return Err(RoundupError::Cancelled);
            }

            let update = match current {
                GraphNode::Planner => self.planner.run(&state, cancel).await?,
                GraphNode::Agent(kind) => self.collector(kind).run(&state, cancel).await?,
                GraphNode::Summarizer => self.summarizer.run(&state, cancel).await?,
                GraphNode::End => break,
            };
            state.apply(update);

            let next = next_node(current, &state.agents_to_invoke);
            info!("Workflow {}: {:?} -> {:?}", run_id, current, next);
            current = next;
        }

        let total = state.all_items.as_deref().map(|items| items.len()).unwrap_or(0);
        info!("Workflow {}: finished with {} items", run_id, total);
        Ok(state)
    }

    fn collector(&self, kind: AgentKind) -> &Collector {
        // Collectors are laid out in priority order by `new`.
        self.collectors
            .iter()
            .find(|c| c.kind() == kind)
            .unwrap_or(&self.collectors[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::OfflineModel;
    use tempfile::tempdir;

    fn workflow(dir: &tempfile::TempDir) -> Workflow {
        let store = Arc::new(TaskStore::new(dir.path().join("task_items.csv")));
        Workflow::new(Arc::new(OfflineModel), Sources::fixtures(), store)
    }

    #[test]
    fn test_routing_honors_priority_order() {
        let selected = vec![AgentKind::Scan, AgentKind::Compliance];
        assert_eq!(
            next_node(GraphNode::Planner, &selected),
            GraphNode::Agent(AgentKind::Compliance)
        );
        assert_eq!(
            next_node(GraphNode::Agent(AgentKind::Compliance), &selected),
            GraphNode::Agent(AgentKind::Scan)
        );
        assert_eq!(
            next_node(GraphNode::Agent(AgentKind::Scan), &selected),
            GraphNode::Summarizer
        );
    }

    #[test]
    fn test_routing_skips_unselected_agents() {
        let selected = vec![AgentKind::Issue];
        assert_eq!(
            next_node(GraphNode::Planner, &selected),
            GraphNode::Agent(AgentKind::Issue)
        );
        assert_eq!(
            next_node(GraphNode::Agent(AgentKind::Issue), &selected),
            GraphNode::Summarizer
        );
    }

    #[test]
    fn test_empty_selection_routes_straight_to_summarizer() {
        assert_eq!(next_node(GraphNode::Planner, &[]), GraphNode::Summarizer);
        assert_eq!(next_node(GraphNode::Summarizer, &[]), GraphNode::End);
    }

    #[test]
    fn test_scan_always_precedes_summarizer_terminally() {
        let all = AgentKind::PRIORITY.to_vec();
        assert_eq!(
            next_node(GraphNode::Agent(AgentKind::Scan), &all),
            GraphNode::Summarizer
        );
    }

    #[tokio::test]
    async fn test_run_single_agent_query() {
        let dir = tempdir().unwrap();
        let wf = workflow(&dir);

        let state = wf
            .run_query("list open bugs", "APP-9", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(state.agents_to_invoke, vec![AgentKind::Issue]);
        // Tracker fixture has four rows; compliance and scan never ran.
        assert_eq!(state.issue_items.as_deref().map(|items| items.len()), Some(4));
        assert!(state.compliance_items.is_none());
        assert!(state.scan_items.is_none());
        assert_eq!(state.all_items.as_deref().map(|items| items.len()), Some(4));
        assert!(state.final_summary.is_some());
    }

    #[tokio::test]
    async fn test_run_rejects_empty_inputs() {
        let dir = tempdir().unwrap();
        let wf = workflow(&dir);
        let cancel = CancellationToken::new();

        let result = wf.run_query("", "APP-9", &cancel).await;
        assert!(matches!(result, Err(RoundupError::InvalidInput(_))));

        let result = wf.run_query("query", "  ", &cancel).await;
        assert!(matches!(result, Err(RoundupError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_run_rejects_preselected_agents() {
        let dir = tempdir().unwrap();
        let wf = workflow(&dir);

        let mut state = WorkflowState::new("query", "APP-9");
        state.agents_to_invoke = vec![AgentKind::Scan];
        let result = wf.run(state, &CancellationToken::new()).await;
        assert!(matches!(result, Err(RoundupError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_aborts_run() {
        let dir = tempdir().unwrap();
        let wf = workflow(&dir);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = wf.run_query("list open bugs", "APP-9", &cancel).await;
        assert!(matches!(result, Err(RoundupError::Cancelled)));
    }
}
