//! Completion requests and responses.
//!
//! A producer builds a [`CompletionRequest`] and gets back a
//! [`ResponseHandle`]. The request owns the sending half of a one-shot
//! slot; the worker consumes the request when it replies, so a second
//! reply cannot be written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::{PipelineError, QueueError};
use crate::line::{Line, flatten_newlines};

/// Replies are posted as tweets: 280 chars max, and engine tokens average
/// about 4 chars. 55 tokens keeps the reply near 220 chars.
pub const MAX_REPLY_TOKENS: u32 = 55;

/// Truncate generated text where the engine starts writing a new speaker turn.
pub const DEFAULT_STOP_PATTERN: &str = r"\n[A-Za-z0-9]+:";

pub const DEFAULT_TEMPERATURE: f32 = 0.9;

/// Unique identifier for a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the prompt comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PromptSource {
    /// Literal prompt text, sent as-is once newlines are flattened.
    Text(String),
    /// A conversation thread, oldest turn first, rendered with the persona.
    Thread(Vec<Line>),
}

impl PromptSource {
    /// Literal text with newlines flattened to spaces.
    pub fn text(text: impl AsRef<str>) -> Self {
        Self::Text(flatten_newlines(text.as_ref()))
    }

    pub fn thread(lines: impl IntoIterator<Item = Line>) -> Self {
        Self::Thread(lines.into_iter().collect())
    }
}

/// One unit of work for the completion worker.
#[derive(Debug)]
pub struct CompletionRequest {
    pub id: RequestId,

    /// Prompt text or thread to render
    pub source: PromptSource,

    /// Raw model name, validated by the worker before any engine call
    pub model: String,

    /// Regular expression marking where the reply should be cut
    pub stop_pattern: String,

    pub temperature: f32,

    pub max_tokens: u32,

    reply: oneshot::Sender<CompletionResponse>,
}

impl CompletionRequest {
    /// Create a request with default sampling settings and a fresh reply slot.
    pub fn new(source: PromptSource, model: impl Into<String>) -> (Self, ResponseHandle) {
        let (tx, rx) = oneshot::channel();
        let id = RequestId::new();
        let request = Self {
            id,
            source,
            model: model.into(),
            stop_pattern: DEFAULT_STOP_PATTERN.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: MAX_REPLY_TOKENS,
            reply: tx,
        };
        (request, ResponseHandle { id, rx })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_stop_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.stop_pattern = pattern.into();
        self
    }

    /// Deliver the response, consuming the request and its reply slot.
    ///
    /// Returns `false` if the producer stopped waiting.
    pub fn respond(self, response: CompletionResponse) -> bool {
        match self.reply.send(response) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(request_id = %self.id, "Producer dropped its response handle before delivery");
                false
            }
        }
    }
}

/// The receiving side of a request's reply slot.
#[derive(Debug)]
pub struct ResponseHandle {
    id: RequestId,
    rx: oneshot::Receiver<CompletionResponse>,
}

impl ResponseHandle {
    pub fn request_id(&self) -> RequestId {
        self.id
    }

    /// Wait for the worker's reply.
    pub async fn recv(self) -> Result<CompletionResponse, QueueError> {
        self.rx.await.map_err(|_| QueueError::ResponseDropped)
    }

    /// Non-blocking check; `None` while the reply is still pending.
    pub fn try_recv(&mut self) -> Option<Result<CompletionResponse, QueueError>> {
        match self.rx.try_recv() {
            Ok(response) => Some(Ok(response)),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(QueueError::ResponseDropped)),
        }
    }
}

/// The single reply delivered for a request.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub request_id: RequestId,

    /// Filtered reply text; empty when `error` is set
    pub text: String,

    pub error: Option<PipelineError>,

    /// Generation calls made for this request
    pub attempts: u32,

    pub completed_at: DateTime<Utc>,
}

impl CompletionResponse {
    pub fn success(request_id: RequestId, text: impl Into<String>, attempts: u32) -> Self {
        Self {
            request_id,
            text: text.into(),
            error: None,
            attempts,
            completed_at: Utc::now(),
        }
    }

    pub fn failure(request_id: RequestId, error: PipelineError, attempts: u32) -> Self {
        Self {
            request_id,
            text: String::new(),
            error: Some(error),
            attempts,
            completed_at: Utc::now(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<String, PipelineError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.text),
        }
    }
}
