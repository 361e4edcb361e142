//! The completion worker.

use replybot_config::{AppConfig, PipelineConfig};
use replybot_core::engine::{CompletionEngine, CompletionParams};
use replybot_core::error::PipelineError;
use replybot_core::line::flatten_newlines;
use replybot_core::model::ModelId;
use replybot_core::request::{CompletionRequest, CompletionResponse, PromptSource};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::filter::ResponseFilter;
use crate::prompt::Persona;
use crate::queue::RequestReceiver;
use crate::safety::SafetyClassifier;

/// Retry and limit settings for the worker.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Regenerations allowed after an unsafe rating
    pub max_completion_retries: u32,

    /// Reply used once retries are exhausted
    pub fallback_response: String,

    /// Upper bound on a request's `max_tokens`
    pub max_reply_tokens: u32,
}

impl From<&PipelineConfig> for WorkerSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_completion_retries: config.max_completion_retries,
            fallback_response: config.fallback_response.clone(),
            max_reply_tokens: config.max_reply_tokens,
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

/// Counters reported when the worker stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Successful responses that carry the fallback reply
    pub fallbacks: u64,
    /// Responses whose producer had stopped waiting
    pub undelivered: u64,
}

/// An accepted generation.
struct Generation {
    text: String,
    exhausted: bool,
}

/// Drains a request queue, one request at a time.
pub struct CompletionWorker {
    engine: Arc<dyn CompletionEngine>,
    classifier: SafetyClassifier,
    persona: Persona,
    settings: WorkerSettings,
}

impl CompletionWorker {
    /// Create a worker with the default persona and settings.
    pub fn new(engine: Arc<dyn CompletionEngine>, classifier: SafetyClassifier) -> Self {
        Self {
            engine,
            classifier,
            persona: Persona::default(),
            settings: WorkerSettings::default(),
        }
    }

    /// Build a worker whose generation and classifier calls share `engine`.
    pub fn from_config(engine: Arc<dyn CompletionEngine>, config: &AppConfig) -> Self {
        let classifier = SafetyClassifier::new(engine.clone(), &config.safety);
        Self::new(engine, classifier)
            .with_persona(Persona::from(&config.persona))
            .with_settings(WorkerSettings::from(&config.pipeline))
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_settings(mut self, settings: WorkerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Run on a dedicated Tokio task.
    pub fn spawn(self, receiver: RequestReceiver) -> JoinHandle<WorkerSummary> {
        tokio::spawn(self.run(receiver))
    }

    /// Process requests until the queue is closed and drained.
    ///
    /// Each response is delivered before the next request is dequeued.
    pub async fn run(self, mut receiver: RequestReceiver) -> WorkerSummary {
        info!(engine = %self.engine.name(), classifier = %self.classifier.model(), "Completion worker started");
        let mut summary = WorkerSummary::default();

        while let Some(request) = receiver.recv().await {
            let (response, exhausted) = self.handle(&request).await;

            summary.processed += 1;
            if response.is_ok() {
                summary.succeeded += 1;
                if exhausted {
                    summary.fallbacks += 1;
                }
            } else {
                summary.failed += 1;
            }

            if !request.respond(response) {
                summary.undelivered += 1;
            }
        }

        info!(
            processed = summary.processed,
            failed = summary.failed,
            fallbacks = summary.fallbacks,
            "Request queue closed, completion worker stopping"
        );
        summary
    }

    /// Produce the response for one request without delivering it.
    pub async fn process(&self, request: &CompletionRequest) -> CompletionResponse {
        self.handle(request).await.0
    }

    async fn handle(&self, request: &CompletionRequest) -> (CompletionResponse, bool) {
        let mut attempts = 0;
        match self.complete_request(request, &mut attempts).await {
            Ok(generation) => {
                info!(request_id = %request.id, attempts, "Completion delivered");
                (
                    CompletionResponse::success(request.id, generation.text, attempts),
                    generation.exhausted,
                )
            }
            Err(e) => {
                warn!(request_id = %request.id, attempts, error = %e, "Completion failed");
                (CompletionResponse::failure(request.id, e, attempts), false)
            }
        }
    }

    async fn complete_request(
        &self,
        request: &CompletionRequest,
        attempts: &mut u32,
    ) -> Result<Generation, PipelineError> {
        let (model, filter) = self.validate(request)?;
        let prompt = self.build_prompt(&request.source);

        debug!(request_id = %request.id, model = %model, prompt_len = prompt.len(), "Generating completion");

        let params = CompletionParams::new(model.as_str(), prompt, request.max_tokens, request.temperature);
        let generation = self.generate_safely(request, params, attempts).await?;

        Ok(Generation {
            text: filter.apply(&generation.text).to_string(),
            exhausted: generation.exhausted,
        })
    }

    /// Checks that need no network call.
    fn validate(&self, request: &CompletionRequest) -> Result<(ModelId, ResponseFilter), PipelineError> {
        let model = request
            .model
            .parse::<ModelId>()
            .map_err(|_| PipelineError::InvalidModel(request.model.clone()))?;

        if !(0.0..=1.0).contains(&request.temperature) {
            return Err(PipelineError::InvalidParameters(format!(
                "temperature {} is outside [0, 1]",
                request.temperature
            )));
        }

        if request.max_tokens == 0 || request.max_tokens > self.settings.max_reply_tokens {
            return Err(PipelineError::InvalidParameters(format!(
                "max_tokens {} is outside 1..={}",
                request.max_tokens, self.settings.max_reply_tokens
            )));
        }

        let filter = ResponseFilter::new(&request.stop_pattern)?;
        Ok((model, filter))
    }

    fn build_prompt(&self, source: &PromptSource) -> String {
        match source {
            PromptSource::Text(text) => flatten_newlines(text),
            PromptSource::Thread(lines) => self.persona.render(lines),
        }
    }

    /// Generate, then regenerate with the same parameters while the
    /// classifier rates the text unsafe, up to the retry limit.
    async fn generate_safely(
        &self,
        request: &CompletionRequest,
        params: CompletionParams,
        attempts: &mut u32,
    ) -> Result<Generation, PipelineError> {
        let mut retries = 0;

        loop {
            *attempts += 1;
            let completion = self.engine.complete(params.clone()).await?;
            let rating = self.classifier.classify(&completion.text).await?;

            if !rating.is_unsafe() {
                return Ok(Generation {
                    text: completion.text,
                    exhausted: false,
                });
            }

            if retries >= self.settings.max_completion_retries {
                warn!(request_id = %request.id, prompt = %params.prompt, "Max retries reached, using fallback reply");
                return Ok(Generation {
                    text: self.settings.fallback_response.clone(),
                    exhausted: true,
                });
            }

            retries += 1;
            debug!(request_id = %request.id, rating = %rating, retry = retries, "Unsafe completion, regenerating");
        }
    }
}
