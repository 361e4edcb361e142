//! Stop-pattern truncation for generated replies.
//!
//! Engines often keep going past the bot's turn and write the next speaker's
//! line too. The filter cuts the text at the first match of a stop pattern.

use regex_lite::Regex;
use replybot_core::error::PipelineError;

/// A compiled stop pattern.
#[derive(Debug, Clone)]
pub struct ResponseFilter {
    pattern: Regex,
}

impl ResponseFilter {
    pub fn new(pattern: &str) -> Result<Self, PipelineError> {
        let pattern = Regex::new(pattern).map_err(|e| PipelineError::InvalidStopPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Text before the first match, or all of it when nothing matches.
    ///
    /// Match offsets always fall on char boundaries, so the slice never
    /// splits a multi-byte character.
    pub fn apply<'a>(&self, text: &'a str) -> &'a str {
        match self.pattern.find(text) {
            Some(m) => &text[..m.start()],
            None => text,
        }
    }
}
