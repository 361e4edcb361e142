//! The closed set of completion models a request may name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A conversational completion model.
///
/// Requests carry the model as a raw name so producers can pass through
/// whatever configuration supplied; the worker parses it into a `ModelId`
/// before any network call and rejects anything outside this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelId {
    Ada,
    Babbage,
    Curie,
    Davinci,
    CurieInstructBeta,
    DavinciInstructBeta,
}

impl ModelId {
    pub const ALL: [ModelId; 6] = [
        ModelId::Ada,
        ModelId::Babbage,
        ModelId::Curie,
        ModelId::Davinci,
        ModelId::CurieInstructBeta,
        ModelId::DavinciInstructBeta,
    ];

    /// The engine-facing model name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Ada => "ada",
            ModelId::Babbage => "babbage",
            ModelId::Curie => "curie",
            ModelId::Davinci => "davinci",
            ModelId::CurieInstructBeta => "curie-instruct-beta",
            ModelId::DavinciInstructBeta => "davinci-instruct-beta",
        }
    }

    /// Membership predicate over raw model names.
    pub fn is_valid(name: &str) -> bool {
        name.parse::<ModelId>().is_ok()
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a name is not in the model set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model: {0}")]
pub struct UnknownModel(pub String);

impl FromStr for ModelId {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelId::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}
