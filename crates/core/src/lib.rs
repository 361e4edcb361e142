//! # replybot Core
//!
//! Domain types, traits, and error definitions for the replybot completion
//! pipeline. This crate has **no transport dependencies**: it defines the
//! model that the engine adapters and the pipeline implement against.
//!
//! ## Layout
//!
//! - [`line`]: one turn of a conversation thread
//! - [`model`]: the closed set of completion models
//! - [`request`]: completion requests, responses, and the single-use reply slot
//! - [`rating`]: sensitivity ratings produced by the safety classifier
//! - [`engine`]: the `CompletionEngine` trait every backend implements
//! - [`error`]: error taxonomy per bounded context

pub mod engine;
pub mod error;
pub mod line;
pub mod model;
pub mod rating;
pub mod request;

// Re-export key types at crate root for ergonomics
pub use engine::{Completion, CompletionEngine, CompletionParams, Usage};
pub use error::{EngineError, PipelineError, QueueError};
pub use line::Line;
pub use model::ModelId;
pub use rating::SensitivityRating;
pub use request::{CompletionRequest, CompletionResponse, PromptSource, RequestId, ResponseHandle};
