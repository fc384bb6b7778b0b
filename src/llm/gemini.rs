// SPDX-License-Identifier: MIT

//! Gemini Model - Google's Gemini API implementation

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::env;
use tokio_util::sync::CancellationToken;

use super::Model;
use crate::error::ModelError;

/// Google Gemini model implementation
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model_name: String,
}

impl GeminiModel {
    /// Create a new GeminiModel
    ///
    /// Requires `GOOGLE_API_KEY` environment variable to be set.
    pub fn new(model_name: impl Into<String>) -> Result<Self, ModelError> {
        let api_key = env::var("GOOGLE_API_KEY")
            .map_err(|_| ModelError::ApiKeyMissing("gemini".to_string()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            model_name: model_name.into(),
        })
    }
}

/// Build the generateContent request body
pub fn build_request_body(system: &str, user: &str) -> serde_json::Value {
    json!({
        "systemInstruction": { "parts": [{ "text": system }] },
        "contents": [{ "role": "user", "parts": [{ "text": user }] }]
    })
}

/// Concatenate the text parts of the first candidate
pub fn extract_candidate_text(resp: &serde_json::Value) -> Result<String, ModelError> {
    let candidates = resp["candidates"]
        .as_array()
        .ok_or_else(|| ModelError::invalid_response("no candidates in response"))?;
    let candidate = candidates
        .first()
        .ok_or_else(|| ModelError::invalid_response("empty candidates"))?;
    let parts = candidate["content"]["parts"]
        .as_array()
        .ok_or_else(|| ModelError::invalid_response("no parts in first candidate"))?;

    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        return Err(ModelError::invalid_response("no text parts in candidate"));
    }
    Ok(text)
}

#[async_trait]
impl Model for GeminiModel {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ModelError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model_name, self.api_key
        );
        let body = build_request_body(system, user);
        log::debug!("Gemini request: model={}", self.model_name);

        let request = self.client.post(&url).json(&body).send();
        let resp = tokio::select! {
            _ = cancel.cancelled() => return Err(ModelError::Cancelled),
            resp = request => resp?,
        };

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ModelError::api("gemini", format!("{}: {}", status, text)));
        }

        let resp_json: serde_json::Value = resp.json().await?;
        extract_candidate_text(&resp_json)
    }
}
