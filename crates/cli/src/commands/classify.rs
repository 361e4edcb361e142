//! `replybot classify`: rate a piece of text.

use replybot_pipeline::SafetyClassifier;
use std::path::Path;

pub async fn run(config_path: Option<&Path>, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config_with_key(config_path)?;
    let engine = replybot_providers::build_from_config(&config)?;
    let classifier = SafetyClassifier::new(engine, &config.safety);

    let rating = classifier.classify(text).await?;
    println!("{rating}");
    Ok(())
}
