//! Thread-to-prompt rendering.
//!
//! A prompt is the persona preamble, then one tagged paragraph per thread
//! turn in the order given, then an open assistant tag so the engine
//! continues speaking as the bot.
//!
//! Each turn's tag is followed by the handle it addresses (`Rook:@user`),
//! so the examples the engine continues from all open with a mention.

use replybot_config::PersonaConfig;
use replybot_core::line::Line;

/// Persona framing for rendered prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    preamble: String,
    assistant_tag: String,
    other_tag: String,
    bot_handle: String,
    user_handle: String,
}

impl Persona {
    pub fn new(
        preamble: impl Into<String>,
        assistant_tag: impl Into<String>,
        other_tag: impl Into<String>,
    ) -> Self {
        Self {
            preamble: preamble.into(),
            assistant_tag: assistant_tag.into(),
            other_tag: other_tag.into(),
            bot_handle: String::new(),
            user_handle: String::new(),
        }
    }

    /// Address each turn to the other side: the user's turns mention
    /// `bot_handle`, the bot's turns mention `user_handle`.
    pub fn with_handles(mut self, bot_handle: impl Into<String>, user_handle: impl Into<String>) -> Self {
        self.bot_handle = bot_handle.into();
        self.user_handle = user_handle.into();
        self
    }

    pub fn assistant_tag(&self) -> &str {
        &self.assistant_tag
    }

    /// Render `lines` (oldest first) into a prompt.
    pub fn render(&self, lines: &[Line]) -> String {
        let body: usize = lines
            .iter()
            .map(|l| {
                let (tag, handle) = self.tag_for(l);
                l.text().len() + tag.len() + handle.len() + 3
            })
            .sum();
        let mut prompt = String::with_capacity(self.preamble.len() + body + self.assistant_tag.len());

        prompt.push_str(&self.preamble);
        for line in lines {
            let (tag, handle) = self.tag_for(line);
            prompt.push_str(tag);
            prompt.push_str(handle);
            prompt.push(' ');
            prompt.push_str(line.text());
            prompt.push_str("\n\n");
        }
        prompt.push_str(&self.assistant_tag);
        prompt
    }

    fn tag_for(&self, line: &Line) -> (&str, &str) {
        if line.is_bot() {
            (&self.assistant_tag, &self.user_handle)
        } else {
            (&self.other_tag, &self.bot_handle)
        }
    }
}

impl From<&PersonaConfig> for Persona {
    fn from(config: &PersonaConfig) -> Self {
        Self::new(&config.preamble, &config.assistant_tag, &config.other_tag)
            .with_handles(&config.bot_handle, &config.user_handle)
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::from(&PersonaConfig::default())
    }
}
