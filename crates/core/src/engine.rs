//! The `CompletionEngine` trait over text-completion backends.
//!
//! An engine takes a raw prompt plus sampling parameters and returns the
//! generated continuation. The same trait serves both conversational
//! generation and safety classification; only the model and parameters
//! differ.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::EngineError;

/// Parameters for a single completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams {
    /// The model to use (e.g., "davinci", "content-filter-alpha-c4")
    pub model: String,

    /// The full prompt text
    pub prompt: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,

    /// Nucleus sampling cutoff, omitted when the engine default applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl CompletionParams {
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            max_tokens,
            temperature,
            top_p: None,
        }
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// A generated continuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The text of the first choice
    pub text: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core engine trait.
///
/// The completion worker calls `complete()` without knowing which backend
/// is behind it, so tests can substitute scripted engines.
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    /// A human-readable name for this engine (e.g., "openai").
    fn name(&self) -> &str;

    /// Generate a continuation for the given prompt.
    async fn complete(&self, params: CompletionParams) -> std::result::Result<Completion, EngineError>;

    /// Whether the engine is reachable.
    async fn health_check(&self) -> std::result::Result<bool, EngineError> {
        Ok(true)
    }
}
