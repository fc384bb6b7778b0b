// SPDX-License-Identifier: MIT

//! OpenAI Model - chat-completions API implementation

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::env;
use tokio_util::sync::CancellationToken;

use super::Model;
use crate::error::ModelError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// OpenAI chat-completions model implementation
pub struct OpenAiModel {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
}

impl OpenAiModel {
    /// Create a new OpenAiModel
    ///
    /// Requires `OPENAI_API_KEY` to be set. `OPENAI_BASE_URL` overrides the
    /// endpoint for compatible gateways.
    pub fn new(model_name: impl Into<String>) -> Result<Self, ModelError> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| ModelError::ApiKeyMissing("openai".to_string()))?;
        let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            client: Client::new(),
            api_key,
            model_name: model_name.into(),
            base_url,
        })
    }
}

/// Build the chat-completions request body
pub fn build_request_body(model: &str, system: &str, user: &str) -> serde_json::Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": user }
        ]
    })
}

/// Pull the first choice's message text out of a chat-completions response
pub fn extract_message_text(resp: &serde_json::Value) -> Result<String, ModelError> {
    let choices = resp["choices"]
        .as_array()
        .ok_or_else(|| ModelError::invalid_response("no choices in response"))?;
    let first = choices
        .first()
        .ok_or_else(|| ModelError::invalid_response("empty choices"))?;
    let text = first["message"]["content"]
        .as_str()
        .ok_or_else(|| ModelError::invalid_response("no message content in first choice"))?;
    Ok(text.to_string())
}

#[async_trait]
impl Model for OpenAiModel {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ModelError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = build_request_body(&self.model_name, system, user);
        log::debug!("OpenAI request: model={}", self.model_name);

        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send();
        let resp = tokio::select! {
            _ = cancel.cancelled() => return Err(ModelError::Cancelled),
            resp = request => resp?,
        };

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ModelError::api("openai", format!("{}: {}", status, text)));
        }

        let resp_json: serde_json::Value = resp.json().await?;
        extract_message_text(&resp_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_body_shape() {
        let body = build_request_body("gpt-4o", "be terse", "hello");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be terse");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_extract_message_text() {
        let resp = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "[\"scan\"]" } }
            ]
        });
        assert_eq!(extract_message_text(&resp).unwrap(), "[\"scan\"]");
    }

    #[test]
    fn test_extract_message_text_no_choices() {
        let resp = json!({ "error": { "message": "bad request" } });
        assert!(matches!(
            extract_message_text(&resp),
            Err(ModelError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_extract_message_text_empty_choices() {
        let resp = json!({ "choices": [] });
        assert!(matches!(
            extract_message_text(&resp),
            Err(ModelError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_extract_message_text_missing_content() {
        let resp = json!({ "choices": [ { "message": { "role": "assistant" } } ] });
        assert!(matches!(
            extract_message_text(&resp),
            Err(ModelError::InvalidResponse(_))
        ));
    }
}
