//! HTTP-backed source
//!
//! Production counterpart of the fixture sources: fetches the raw report
//! from `{base_url}/{app_id}` and surfaces transport or status failures as
//! fetch errors.

use async_trait::async_trait;
use reqwest::Client;

use super::Source;
use crate::error::FetchError;
use crate::workflow::state::AgentKind;

pub struct HttpSource {
    client: Client,
    kind: AgentKind,
    base_url: String,
}

impl HttpSource {
    pub fn new(kind: AgentKind, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            kind,
            base_url: base_url.into(),
        }
    }
}

/// Report URL for one application.
pub fn report_url(base_url: &str, app_id: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), app_id)
}

#[async_trait]
impl Source for HttpSource {
    async fn fetch(&self, app_id: &str) -> Result<String, FetchError> {
        let url = report_url(&self.base_url, app_id);
        log::debug!("Fetching {} report from {}", self.kind, url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::new(self.kind, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::new(
                self.kind,
                format!("unexpected status {} from {}", resp.status(), url),
            ));
        }

        resp.text()
            .await
            .map_err(|e| FetchError::new(self.kind, e.to_string()))
    }
}
