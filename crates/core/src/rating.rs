//! Sensitivity ratings returned by the safety classifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal sensitivity of a piece of generated text.
///
/// The classifier is expected to answer 0, 1 or 2, but the value is kept
/// as returned; anything at or above [`SensitivityRating::UNSAFE`] counts
/// as unsafe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensitivityRating(pub i64);

impl SensitivityRating {
    pub const SAFE: SensitivityRating = SensitivityRating(0);
    pub const SENSITIVE: SensitivityRating = SensitivityRating(1);
    pub const UNSAFE: SensitivityRating = SensitivityRating(2);

    pub fn is_unsafe(&self) -> bool {
        *self >= Self::UNSAFE
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            0 => "safe",
            1 => "sensitive",
            2 => "unsafe",
            _ => "out-of-range",
        }
    }
}

impl fmt::Display for SensitivityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}
