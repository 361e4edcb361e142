//! Safety classification of generated text.
//!
//! The classifier is itself a completion model: it reads the text followed by
//! a label cue and answers with a single token, `0` (safe), `1` (sensitive)
//! or `2` (unsafe).

use replybot_config::SafetyConfig;
use replybot_core::engine::{CompletionEngine, CompletionParams};
use replybot_core::error::PipelineError;
use replybot_core::rating::SensitivityRating;
use std::sync::Arc;
use tracing::debug;

/// Rates text through a dedicated classifier model.
pub struct SafetyClassifier {
    engine: Arc<dyn CompletionEngine>,
    model: String,
    sentinel: String,
}

impl SafetyClassifier {
    pub fn new(engine: Arc<dyn CompletionEngine>, config: &SafetyConfig) -> Self {
        Self {
            engine,
            model: config.classifier_model.clone(),
            sentinel: config.sentinel.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn prompt_for(&self, text: &str) -> String {
        format!("{}{}\n--\nLabel:", self.sentinel, text)
    }

    /// Classify `text`. Engine failures and non-numeric labels are errors.
    pub async fn classify(&self, text: &str) -> Result<SensitivityRating, PipelineError> {
        let params = CompletionParams::new(&self.model, self.prompt_for(text), 1, 0.0).with_top_p(0.0);
        let completion = self.engine.complete(params).await?;
        let rating = parse_rating(&completion.text)?;
        debug!(model = %self.model, rating = %rating, "Classified generated text");
        Ok(rating)
    }
}

/// Parse the classifier's single-token answer.
///
/// The value is not range-checked; callers compare against
/// [`SensitivityRating::UNSAFE`].
pub fn parse_rating(token: &str) -> Result<SensitivityRating, PipelineError> {
    token
        .trim()
        .parse::<i64>()
        .map(SensitivityRating)
        .map_err(|_| PipelineError::ClassifierParse {
            token: token.to_string(),
        })
}
