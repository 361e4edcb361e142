//! Completion engine implementations for replybot.
//!
//! All engines implement the `replybot_core::CompletionEngine` trait.
//! [`build_from_config`] assembles the configured engine.

pub mod openai_compat;

pub use openai_compat::OpenAiCompletionEngine;

use replybot_config::AppConfig;
use replybot_core::engine::CompletionEngine;
use replybot_core::error::EngineError;
use std::sync::Arc;
use std::time::Duration;

/// Build the completion engine described by the configuration.
///
/// Generation and classifier calls share this one engine.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn CompletionEngine>, EngineError> {
    let engine = OpenAiCompletionEngine::new(
        &config.engine.name,
        &config.engine.api_url,
        config.api_key.clone().unwrap_or_default(),
        Duration::from_secs(config.engine.timeout_secs),
    )?;
    tracing::debug!(engine = %config.engine.name, url = %config.engine.api_url, "Built completion engine");
    Ok(Arc::new(engine))
}
