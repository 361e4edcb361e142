//! `replybot complete`: one request through the full pipeline.

use replybot_config::AppConfig;
use replybot_core::request::{CompletionRequest, PromptSource, ResponseHandle};
use replybot_pipeline::{CompletionWorker, spawn_pipeline};
use std::path::{Path, PathBuf};

pub struct CompleteArgs {
    pub prompt: Option<String>,
    pub thread: Option<PathBuf>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stop: Option<String>,
}

pub async fn run(config_path: Option<&Path>, args: CompleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config_with_key(config_path)?;
    let (request, handle) = build_request(&config, args)?;
    let engine = replybot_providers::build_from_config(&config)?;

    let worker = CompletionWorker::from_config(engine, &config);
    let (queue, worker_handle) = spawn_pipeline(worker, config.pipeline.queue_capacity)?;

    queue.enqueue(request).await?;
    queue.close();

    let response = handle.recv().await?;
    let attempts = response.attempts;
    let result = response.into_result();

    let summary = worker_handle.await?;
    tracing::debug!(?summary, attempts, "Pipeline finished");

    println!("{}", result?);
    Ok(())
}

/// Build the request, filling unset options from the config.
fn build_request(
    config: &AppConfig,
    args: CompleteArgs,
) -> Result<(CompletionRequest, ResponseHandle), Box<dyn std::error::Error>> {
    let source = match (args.prompt, args.thread) {
        (Some(text), _) => PromptSource::text(text),
        (None, Some(path)) => PromptSource::thread(super::read_thread(&path)?),
        (None, None) => return Err("Either --prompt or --thread is required".into()),
    };

    let model = args.model.unwrap_or_else(|| config.default_model.clone());
    let (request, handle) = CompletionRequest::new(source, model);
    let request = request
        .with_temperature(args.temperature.unwrap_or(config.default_temperature))
        .with_max_tokens(args.max_tokens.unwrap_or(config.pipeline.max_reply_tokens))
        .with_stop_pattern(args.stop.unwrap_or_else(|| config.default_stop_pattern.clone()));

    Ok((request, handle))
}
