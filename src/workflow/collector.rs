//! Collector node - the contract shared by the three agents
//!
//! fetch raw report -> extract items (model first, deterministic fallback
//! second) -> persist through the store -> emit a report fragment. Fetch and
//! store failures are fatal; extraction trouble never is, because the
//! fallback parser always terminates.

use std::sync::Arc;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::error::{ModelError, RoundupError};
use crate::llm::{ops, Model};
use crate::sources::Source;
use crate::store::{csv, TaskStore};
use crate::workflow::fallback;
use crate::workflow::state::{AgentKind, StateUpdate, TaskItem, WorkflowState};

pub struct Collector {
    kind: AgentKind,
    source: Arc<dyn Source>,
    model: Arc<dyn Model>,
    store: Arc<TaskStore>,
}

impl Collector {
    pub fn new(
        kind: AgentKind,
        source: Arc<dyn Source>,
        model: Arc<dyn Model>,
        store: Arc<TaskStore>,
    ) -> Self {
        Self {
            kind,
            source,
            model,
            store,
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Run the full collect pipeline for this agent's source.
    pub async fn run(
        &self,
        state: &WorkflowState,
        cancel: &CancellationToken,
    ) -> Result<StateUpdate, RoundupError> {
        info!("{} agent: fetching report for {}", self.kind, state.app_id);
        let document = self.source.fetch(&state.app_id).await?;

        let items = self.extract(&document, &state.app_id, cancel).await?;

        let outcome = self.store.merge(&items)?;
        info!(
            "{} agent: stored items - added {}, updated {}",
            self.kind, outcome.added, outcome.updated
        );

        let report = render_report(self.kind, &items);
        Ok(StateUpdate::for_agent(self.kind, items, report))
    }

    /// Model extraction with the deterministic fallback. Only cancellation
    /// aborts; any other model failure, or model output with no usable rows,
    /// downgrades to the fallback parser.
    async fn extract(
        &self,
        document: &str,
        app_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<TaskItem>, RoundupError> {
        match ops::extract_rows(self.model.as_ref(), document, self.kind, app_id, cancel).await {
            Ok(row_text) => {
                let items = csv::parse_model_rows(&row_text, app_id);
                if !items.is_empty() {
                    info!("{} agent: model extracted {} items", self.kind, items.len());
                    return Ok(items);
                }
                warn!(
                    "{} agent: model output had no usable rows, using fallback parser",
                    self.kind
                );
            }
            Err(ModelError::Cancelled) => return Err(RoundupError::Cancelled),
            Err(e) => {
                warn!(
                    "{} agent: model extraction failed ({}), using fallback parser",
                    self.kind, e
                );
            }
        }

        let items = fallback::extract_items(document, self.kind, app_id);
        info!("{} agent: fallback extracted {} items", self.kind, items.len());
        Ok(items)
    }
}

/// Report fragment: one count line plus the extracted rows in a fenced block.
pub fn render_report(kind: AgentKind, items: &[TaskItem]) -> String {
    format!(
        "**{} Agent:** Found {} {}.\n\n```csv\n{}```",
        kind.title(),
        items.len(),
        kind.items_noun(),
        csv::render_table(items)
    )
}
