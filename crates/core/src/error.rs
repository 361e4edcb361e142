//! Error types for the replybot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum. Per-request failures are
//! [`PipelineError`]s and travel on the request's response slot, wrapping
//! any [`EngineError`]; [`QueueError`] stays on the producer side.

use thiserror::Error;

/// Failures talking to the completion engine (transport, auth, rate limits).
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by engine, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Engine not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Per-request failures reported on the request's own response slot.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("Requested invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid request parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid stop pattern {pattern:?}: {reason}")]
    InvalidStopPattern { pattern: String, reason: String },

    #[error("Completion engine failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Safety classifier returned a non-numeric label: {token:?}")]
    ClassifierParse { token: String },
}

/// Failures on the producer side of the request queue.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Request queue is closed")]
    Closed,

    #[error("Request queue is full")]
    Full,

    #[error("Request queue capacity must be at least 1")]
    ZeroCapacity,

    #[error("Worker dropped the response slot without replying")]
    ResponseDropped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_displays_correctly() {
        let err: PipelineError = EngineError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        }
        .into();
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn invalid_model_names_the_model() {
        let err = PipelineError::InvalidModel("gpt-9".into());
        assert_eq!(err.to_string(), "Requested invalid model: gpt-9");
    }

    #[test]
    fn engine_error_converts_into_pipeline_error() {
        let err: PipelineError = EngineError::Network("connection reset".into()).into();
        assert!(matches!(err, PipelineError::Engine(EngineError::Network(_))));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn classifier_parse_shows_token() {
        let err = PipelineError::ClassifierParse { token: "maybe".into() };
        assert!(err.to_string().contains("\"maybe\""));
    }
}
