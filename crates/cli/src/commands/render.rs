//! `replybot render`: show the prompt a thread renders to. No network.

use replybot_pipeline::Persona;
use std::path::Path;

pub fn run(config_path: Option<&Path>, thread: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let lines = super::read_thread(thread)?;
    print!("{}", Persona::from(&config.persona).render(&lines));
    println!();
    Ok(())
}
