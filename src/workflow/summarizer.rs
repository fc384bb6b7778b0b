//! Summarizer node
//!
//! Folds the per-agent reports into one narrative and the combined item
//! list. The model writes the narrative when it can; otherwise a fixed
//! template does, so a completed run always carries a summary.

use std::sync::Arc;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::error::{ModelError, RoundupError};
use crate::llm::{ops, Model};
use crate::store::TaskStore;
use crate::workflow::state::{AgentKind, StateUpdate, TaskItem, WorkflowState};

pub struct Summarizer {
    model: Arc<dyn Model>,
    store: Arc<TaskStore>,
}

impl Summarizer {
    pub fn new(model: Arc<dyn Model>, store: Arc<TaskStore>) -> Self {
        Self { model, store }
    }

    pub async fn run(
        &self,
        state: &WorkflowState,
        cancel: &CancellationToken,
    ) -> Result<StateUpdate, RoundupError> {
        let all_items = collect_all_items(state);

        let summary = match ops::summarize(
            self.model.as_ref(),
            &state.user_query,
            state.response_for(AgentKind::Compliance),
            state.response_for(AgentKind::Issue),
            state.response_for(AgentKind::Scan),
            cancel,
        )
        .await
        {
            Ok(text) => {
                info!("Summarizer: model narrative generated");
                text
            }
            Err(ModelError::Cancelled) => return Err(RoundupError::Cancelled),
            Err(e) => {
                warn!("Summarizer: model call failed ({}), using template", e);
                self.template_summary(state, all_items.len())
            }
        };

        Ok(StateUpdate {
            final_summary: Some(summary),
            all_items: Some(all_items),
            ..Default::default()
        })
    }

    fn template_summary(&self, state: &WorkflowState, total_items: usize) -> String {
        let agents = state
            .agents_to_invoke
            .iter()
            .map(|kind| kind.tag())
            .collect::<Vec<_>>()
            .join(", ");

        let mut parts = vec![
            "## Workflow Summary\n".to_string(),
            format!("**Query:** {}", state.user_query),
            format!("**App ID:** {}", state.app_id),
            format!("**Agents invoked:** {}\n", agents),
        ];

        for kind in AgentKind::PRIORITY {
            if let Some(response) = state.response_for(kind) {
                if !response.is_empty() {
                    parts.push(format!("### {} Results", kind.title()));
                    parts.push(response.to_string());
                }
            }
        }

        parts.push(format!("\n**Total items:** {}", total_items));
        parts.push(format!(
            "All items have been stored to `{}`",
            self.store.path().display()
        ));
        parts.join("\n")
    }
}

/// The three agents' item lists concatenated in priority order. Agents that
/// did not run contribute nothing.
pub fn collect_all_items(state: &WorkflowState) -> Vec<TaskItem> {
    AgentKind::PRIORITY
        .iter()
        .flat_map(|kind| state.items_for(*kind).unwrap_or_default().iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::OfflineModel;
    use crate::workflow::collector::render_report;
    use async_trait::async_trait;
    use tempfile::tempdir;

    struct FixedModel(&'static str);

    #[async_trait]
    impl Model for FixedModel {
        async fn complete(
            &self,
            _system: &str,
            _user: &str,
            _cancel: &CancellationToken,
        ) -> Result<String, ModelError> {
            Ok(self.0.to_string())
        }
    }

    fn item(task: &str) -> TaskItem {
        TaskItem {
            app_id: "APP-3".to_string(),
            task: task.to_string(),
            ..Default::default()
        }
    }

    fn summarizer(model: Arc<dyn Model>) -> (Summarizer, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(TaskStore::new(dir.path().join("task_items.csv")));
        (Summarizer::new(model, store), dir)
    }

    fn state_with_two_agents() -> WorkflowState {
        let mut state = WorkflowState::new("show compliance and scan findings", "APP-3");
        state.apply(StateUpdate {
            agents_to_invoke: Some(vec![AgentKind::Compliance, AgentKind::Scan]),
            ..Default::default()
        });
        state.apply(StateUpdate::for_agent(
            AgentKind::Scan,
            vec![item("scan finding")],
            render_report(AgentKind::Scan, &[item("scan finding")]),
        ));
        state.apply(StateUpdate::for_agent(
            AgentKind::Compliance,
            vec![item("compliance one"), item("compliance two")],
            render_report(
                AgentKind::Compliance,
                &[item("compliance one"), item("compliance two")],
            ),
        ));
        state
    }

    #[test]
    fn test_all_items_concatenate_in_priority_order() {
        let state = state_with_two_agents();
        let all = collect_all_items(&state);
        // Compliance precedes scan even though scan was applied first.
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].task, "compliance one");
        assert_eq!(all[2].task, "scan finding");
    }

    #[test]
    fn test_all_items_empty_when_no_agent_ran() {
        let state = WorkflowState::new("anything", "APP-3");
        assert!(collect_all_items(&state).is_empty());
    }

    #[tokio::test]
    async fn test_model_narrative_is_used_verbatim() {
        let (summarizer, _dir) = summarizer(Arc::new(FixedModel("Three items, two urgent.")));
        let update = summarizer
            .run(&state_with_two_agents(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(update.final_summary.as_deref(), Some("Three items, two urgent."));
        assert_eq!(update.all_items.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_template_summary_when_model_unavailable() {
        let (summarizer, _dir) = summarizer(Arc::new(OfflineModel));
        let update = summarizer
            .run(&state_with_two_agents(), &CancellationToken::new())
            .await
            .unwrap();

        let summary = update.final_summary.unwrap();
        assert!(summary.contains("## Workflow Summary"));
        assert!(summary.contains("**Query:** show compliance and scan findings"));
        assert!(summary.contains("**App ID:** APP-3"));
        assert!(summary.contains("**Agents invoked:** compliance, scan"));
        assert!(summary.contains("### Compliance Results"));
        assert!(summary.contains("### Scan Results"));
        assert!(!summary.contains("### Issue Results"));
        assert!(summary.contains("**Total items:** 3"));
        assert!(summary.contains("task_items.csv"));
    }

    #[tokio::test]
    async fn test_summary_never_empty_for_empty_run() {
        let (summarizer, _dir) = summarizer(Arc::new(OfflineModel));
        let mut state = WorkflowState::new("no agents matched", "APP-3");
        state.agents_to_invoke = Vec::new();

        let update = summarizer.run(&state, &CancellationToken::new()).await.unwrap();
        let summary = update.final_summary.unwrap();
        assert!(!summary.is_empty());
        assert!(summary.contains("**Total items:** 0"));
        assert_eq!(update.all_items.unwrap().len(), 0);
    }
}
