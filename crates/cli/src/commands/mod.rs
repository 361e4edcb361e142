pub mod classify;
pub mod complete;
pub mod config_cmd;
pub mod doctor;
pub mod render;

use replybot_config::AppConfig;
use replybot_core::line::Line;
use std::path::Path;

/// Load the config from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    config.map_err(|e| format!("Failed to load config: {e}").into())
}

/// Load the config and insist on an API key.
pub fn load_config_with_key(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = load_config(path)?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    REPLYBOT_API_KEY = 'sk-...'");
        eprintln!("    OPENAI_API_KEY   = 'sk-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    Ok(config)
}

/// Read a thread file: a JSON array of `{ "is_bot": bool, "text": string }`.
pub fn read_thread(path: &Path) -> Result<Vec<Line>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read thread file {}: {e}", path.display()))?;
    let lines: Vec<Line> = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid thread file {}: {e}", path.display()))?;
    Ok(lines)
}
