// SPDX-License-Identifier: MIT

//! Data sources behind the collector agents
//!
//! Each collector fetches one raw HTML report for an application id. The
//! fixture sources carry embedded sample reports; [`http::HttpSource`] talks
//! to a real endpoint. A fetch failure is fatal for the run, so sources
//! should only fail when the document is genuinely unavailable.

pub mod compliance;
pub mod http;
pub mod scan;
pub mod tracker;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::workflow::state::AgentKind;

/// One raw-document source.
#[async_trait]
pub trait Source: Send + Sync {
    async fn fetch(&self, app_id: &str) -> Result<String, FetchError>;
}

/// The three sources a workflow draws from, one per agent kind.
#[derive(Clone)]
pub struct Sources {
    pub compliance: Arc<dyn Source>,
    pub tracker: Arc<dyn Source>,
    pub scan: Arc<dyn Source>,
}

impl std::fmt::Debug for Sources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sources").finish_non_exhaustive()
    }
}

impl Sources {
    /// Fixture-backed bundle with the embedded sample reports.
    pub fn fixtures() -> Self {
        Self {
            compliance: Arc::new(compliance::ComplianceSource),
            tracker: Arc::new(tracker::TrackerSource),
            scan: Arc::new(scan::ScanSource),
        }
    }

    pub fn for_kind(&self, kind: AgentKind) -> Arc<dyn Source> {
        match kind {
            AgentKind::Compliance => Arc::clone(&self.compliance),
            AgentKind::Issue => Arc::clone(&self.tracker),
            AgentKind::Scan => Arc::clone(&self.scan),
        }
    }
}
