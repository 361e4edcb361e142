//! `replybot config`: show the effective configuration.

use std::path::Path;

pub fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    println!("{}", config.to_redacted_toml()?);
    Ok(())
}
