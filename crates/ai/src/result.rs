use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Advisory output of an AI provider.
///
/// This is *not* a domain record. Callers may persist the text alongside a job
/// or photo, but it never changes domain state on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiResponse {
    /// Name of the provider that produced the text (e.g. "LocalFallback").
    pub provider: String,
    pub text: String,
}

impl AiResponse {
    pub fn new(provider: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("inference failed: {0}")]
    InferenceFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}
