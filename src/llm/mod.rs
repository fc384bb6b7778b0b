// SPDX-License-Identifier: MIT

//! Model layer - the opaque text-completion seam
//!
//! The workflow only ever needs "instructions in, text out"; everything
//! provider-specific stays behind [`Model`]. Implementations:
//! - [openai] - OpenAI-compatible chat-completions API
//! - [gemini] - Google's Gemini API
//!
//! [`OfflineModel`] is the no-credentials stand-in: it fails every call, so
//! each workflow step takes its deterministic fallback instead.

pub mod gemini;
pub mod openai;
pub mod ops;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ModelError;

/// Core trait for text-completion backends.
#[async_trait]
pub trait Model: Send + Sync {
    /// Complete `user` under `system` instructions.
    ///
    /// Implementations must watch `cancel` and surface
    /// [`ModelError::Cancelled`] promptly instead of finishing the call.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ModelError>;
}

/// Model used when no provider credentials are configured.
pub struct OfflineModel;

#[async_trait]
impl Model for OfflineModel {
    async fn complete(
        &self,
        _system: &str,
        _user: &str,
        _cancel: &CancellationToken,
    ) -> Result<String, ModelError> {
        Err(ModelError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_model_is_always_unavailable() {
        let cancel = CancellationToken::new();
        let result = OfflineModel.complete("system", "user", &cancel).await;
        assert!(matches!(result, Err(ModelError::Unavailable)));
    }
}
