//! Shared test helpers for pipeline tests.

use replybot_config::DEFAULT_CLASSIFIER_MODEL;
use replybot_core::engine::{Completion, CompletionEngine, CompletionParams};
use replybot_core::error::EngineError;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A scripted engine that answers generation and classifier calls separately.
///
/// Calls for the classifier model pop the next scripted rating (default
/// `"0"`); every other call pops the next scripted reply (default
/// `"reply"`). Every call bumps a shared monotonic counter so tests can
/// check ordering across requests.
pub struct ScriptedEngine {
    replies: Mutex<VecDeque<Result<String, EngineError>>>,
    ratings: Mutex<VecDeque<String>>,
    classifier_error: Option<EngineError>,
    always_rating: Option<String>,
    tick: Mutex<usize>,
    generation_log: Mutex<Vec<(usize, CompletionParams)>>,
    classifier_log: Mutex<Vec<CompletionParams>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            ratings: Mutex::new(VecDeque::new()),
            classifier_error: None,
            always_rating: None,
            tick: Mutex::new(0),
            generation_log: Mutex::new(Vec::new()),
            classifier_log: Mutex::new(Vec::new()),
        }
    }

    pub fn replies<'a>(self, replies: impl IntoIterator<Item = &'a str>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .extend(replies.into_iter().map(|r| Ok(r.to_string())));
        self
    }

    pub fn reply_error(self, error: EngineError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn ratings<'a>(self, ratings: impl IntoIterator<Item = &'a str>) -> Self {
        self.ratings
            .lock()
            .unwrap()
            .extend(ratings.into_iter().map(String::from));
        self
    }

    /// Rate everything as unsafe.
    pub fn always_unsafe(mut self) -> Self {
        self.always_rating = Some("2".into());
        self
    }

    pub fn classifier_error(mut self, error: EngineError) -> Self {
        self.classifier_error = Some(error);
        self
    }

    pub fn generation_calls(&self) -> usize {
        self.generation_log.lock().unwrap().len()
    }

    #[allow(dead_code)]
    pub fn classifier_calls(&self) -> usize {
        self.classifier_log.lock().unwrap().len()
    }

    /// Prompts sent for generation, with the tick at which each was sent.
    #[allow(dead_code)]
    pub fn generation_log(&self) -> Vec<(usize, CompletionParams)> {
        self.generation_log.lock().unwrap().clone()
    }

    pub fn classifier_params(&self) -> Vec<CompletionParams> {
        self.classifier_log.lock().unwrap().clone()
    }

    fn next_tick(&self) -> usize {
        let mut tick = self.tick.lock().unwrap();
        let now = *tick;
        *tick += 1;
        now
    }
}

#[async_trait::async_trait]
impl CompletionEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, params: CompletionParams) -> Result<Completion, EngineError> {
        let tick = self.next_tick();

        if params.model == DEFAULT_CLASSIFIER_MODEL {
            self.classifier_log.lock().unwrap().push(params.clone());
            if let Some(error) = &self.classifier_error {
                return Err(error.clone());
            }
            let rating = match &self.always_rating {
                Some(rating) => rating.clone(),
                None => self.ratings.lock().unwrap().pop_front().unwrap_or_else(|| "0".into()),
            };
            return Ok(Completion {
                text: rating,
                model: params.model,
                usage: None,
            });
        }

        self.generation_log.lock().unwrap().push((tick, params.clone()));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("reply".into()))?;
        Ok(Completion {
            text: reply,
            model: params.model,
            usage: None,
        })
    }
}
