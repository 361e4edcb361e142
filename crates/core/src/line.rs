//! One turn of a reconstructed conversation thread.

use serde::{Deserialize, Serialize};

/// A single utterance in a conversation thread.
///
/// The text never contains a newline: the engine reads newlines as turn
/// boundaries, so the constructor flattens them to spaces. Fields are
/// private so a `Line` cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "LineParts")]
pub struct Line {
    is_bot: bool,
    text: String,
}

#[derive(Deserialize)]
struct LineParts {
    #[serde(default)]
    is_bot: bool,
    text: String,
}

impl From<LineParts> for Line {
    fn from(parts: LineParts) -> Self {
        Self::new(parts.is_bot, parts.text)
    }
}

impl Line {
    /// Create a line, replacing any newlines in `text` with spaces.
    pub fn new(is_bot: bool, text: impl Into<String>) -> Self {
        Self {
            is_bot,
            text: flatten_newlines(&text.into()),
        }
    }

    /// A line spoken by the bot itself.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(true, text)
    }

    /// A line spoken by anyone else in the thread.
    pub fn other(text: impl Into<String>) -> Self {
        Self::new(false, text)
    }

    pub fn is_bot(&self) -> bool {
        self.is_bot
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Replace every newline with a single space.
pub fn flatten_newlines(text: &str) -> String {
    text.replace('\n', " ")
}
