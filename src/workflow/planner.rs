//! Planner node
//!
//! Decides which collector agents a query needs. The model is asked first;
//! a service failure or an unusable answer drops to deterministic keyword
//! matching. The keyword path never selects an empty set - a query that
//! matches nothing routes to all three agents.

use std::sync::Arc;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::error::{ModelError, RoundupError};
use crate::llm::{ops, Model};
use crate::workflow::state::{AgentKind, StateUpdate, WorkflowState};

const COMPLIANCE_KEYWORDS: &[&str] = &["compliance", "audit", "certificate", "tci"];
const ISSUE_KEYWORDS: &[&str] = &["issue", "bug", "feature", "task", "tracker", "ticket"];
const SCAN_KEYWORDS: &[&str] = &[
    "scan",
    "vulnerability",
    "vulnerabilities",
    "cve",
    "sast",
    "dast",
];
const ALL_KEYWORDS: &[&str] = &["all", "everything", "complete", "full"];

pub struct Planner {
    model: Arc<dyn Model>,
}

impl Planner {
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self { model }
    }

    /// Decide `agents_to_invoke`. Touches no other field.
    pub async fn run(
        &self,
        state: &WorkflowState,
        cancel: &CancellationToken,
    ) -> Result<StateUpdate, RoundupError> {
        let agents = match ops::route_query(self.model.as_ref(), &state.user_query, cancel).await {
            Ok(agents) if !agents.is_empty() => {
                info!("Planner: model selected {:?}", agents);
                agents
            }
            Ok(_) => {
                warn!("Planner: model returned no usable agents, using keyword routing");
                keyword_route(&state.user_query)
            }
            Err(ModelError::Cancelled) => return Err(RoundupError::Cancelled),
            Err(e) => {
                warn!("Planner: routing call failed ({}), using keyword routing", e);
                keyword_route(&state.user_query)
            }
        };

        Ok(StateUpdate {
            agents_to_invoke: Some(agents),
            ..Default::default()
        })
    }
}

/// Deterministic routing over fixed keyword sets.
///
/// An "all"-class keyword selects all three agents outright; otherwise every
/// agent whose set matched is selected; a query matching nothing selects all
/// three as the conservative default.
pub fn keyword_route(query: &str) -> Vec<AgentKind> {
    let query = query.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|k| query.contains(k));

    if matches(ALL_KEYWORDS) {
        return AgentKind::PRIORITY.to_vec();
    }

    let mut agents = Vec::new();
    if matches(COMPLIANCE_KEYWORDS) {
        agents.push(AgentKind::Compliance);
    }
    if matches(ISSUE_KEYWORDS) {
        agents.push(AgentKind::Issue);
    }
    if matches(SCAN_KEYWORDS) {
        agents.push(AgentKind::Scan);
    }

    if agents.is_empty() {
        return AgentKind::PRIORITY.to_vec();
    }
    agents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::OfflineModel;

    #[test]
    fn test_all_keyword_selects_everything() {
        for query in [
            "show me all tasks",
            "EVERYTHING please",
            "complete overview",
            "full report for the app",
        ] {
            assert_eq!(keyword_route(query), AgentKind::PRIORITY.to_vec(), "{}", query);
        }
    }

    #[test]
    fn test_all_keyword_wins_over_specific_matches() {
        let agents = keyword_route("all open scan vulnerabilities");
        assert_eq!(agents, AgentKind::PRIORITY.to_vec());
    }

    #[test]
    fn test_no_match_defaults_to_everything() {
        assert_eq!(
            keyword_route("what is the weather today"),
            AgentKind::PRIORITY.to_vec()
        );
    }

    #[test]
    fn test_single_agent_match() {
        assert_eq!(
            keyword_route("open CVE findings from the last sast run"),
            vec![AgentKind::Scan]
        );
        assert_eq!(
            keyword_route("upcoming audit deadlines"),
            vec![AgentKind::Compliance]
        );
        assert_eq!(keyword_route("open bugs"), vec![AgentKind::Issue]);
    }

    #[test]
    fn test_multi_agent_match_is_priority_ordered() {
        let agents = keyword_route("scan findings and compliance certificates");
        assert_eq!(agents, vec![AgentKind::Compliance, AgentKind::Scan]);
    }

    #[tokio::test]
    async fn test_planner_without_model_uses_keywords() {
        let planner = Planner::new(Arc::new(OfflineModel));
        let state = WorkflowState::new("list open bugs", "APP-1");
        let cancel = CancellationToken::new();

        let update = planner.run(&state, &cancel).await.unwrap();
        assert_eq!(update.agents_to_invoke, Some(vec![AgentKind::Issue]));
        assert!(update.final_summary.is_none());
    }
}
