//! `replybot doctor`: diagnose configuration and engine health.

use replybot_config::AppConfig;
use replybot_pipeline::ResponseFilter;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("replybot doctor");
    println!("===============\n");

    let mut issues = 0;

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
    if !path.exists() {
        println!("  ⚠️  No config file at {}, using defaults", path.display());
    }

    let config = match super::load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    match ResponseFilter::new(&config.default_stop_pattern) {
        Ok(_) => println!("  ✅ Stop pattern compiles"),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    if config.has_api_key() {
        println!("  ✅ API key configured");

        match replybot_providers::build_from_config(&config) {
            Ok(engine) => match engine.health_check().await {
                Ok(true) => println!("  ✅ Engine '{}' reachable", engine.name()),
                Ok(false) => {
                    println!("  ❌ Engine '{}' unhealthy", engine.name());
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Engine '{}' check failed: {e}", engine.name());
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  ❌ Cannot build engine: {e}");
                issues += 1;
            }
        }
    } else {
        println!("  ⚠️  No API key configured, set REPLYBOT_API_KEY or OPENAI_API_KEY");
        issues += 1;
    }

    println!();
    println!("  Model:       {}", config.default_model);
    println!("  Classifier:  {}", config.safety.classifier_model);
    println!("  Retries:     {}", config.pipeline.max_completion_retries);
    println!("  Queue:       {}", config.pipeline.queue_capacity);

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
