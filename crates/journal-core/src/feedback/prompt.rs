//! Prompt templates: `<prompts_dir>/<name>.md` with a fenced yaml block for model parameters
//! and a `## System Prompt` section.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

pub const FALLBACK_MODEL: &str = "openai/gpt-4o";
pub const FALLBACK_TEMPERATURE: f32 = 0.7;
pub const FALLBACK_MAX_TOKENS: u32 = 150;
pub const FALLBACK_SYSTEM_PROMPT: &str =
    "You are a supportive therapeutic companion. Provide brief, encouraging feedback.";

const SYSTEM_PROMPT_HEADING: &str = "## System Prompt";

static YAML_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```yaml[ \t]*\r?\n(.*?)```").expect("static regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            model: FALLBACK_MODEL.to_string(),
            temperature: FALLBACK_TEMPERATURE,
            max_tokens: FALLBACK_MAX_TOKENS,
            system_prompt: FALLBACK_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Load a named template. Unknown names and unreadable files yield the built-in fallback.
    pub async fn load(prompts_dir: &Path, name: &str) -> Self {
        if !crate::tenant::is_safe_id(name) {
            tracing::warn!(template = name, "invalid prompt template name, using fallback");
            return Self::default();
        }
        let path = prompts_dir.join(format!("{name}.md"));
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                tracing::warn!(path = %path.display(), "prompt template unavailable ({}), using fallback", e);
                Self::default()
            }
        }
    }

    /// Parse template markdown. Missing pieces keep their fallback values.
    pub fn parse(content: &str) -> Self {
        let mut template = Self::default();

        if let Some(block) = YAML_BLOCK.captures(content).and_then(|c| c.get(1)) {
            for line in block.as_str().lines() {
                let Some((key, value)) = line.split_once(':') else {
                    continue;
                };
                let value = value.trim();
                match key.trim() {
                    "model" if !value.is_empty() => template.model = value.to_string(),
                    "temperature" => {
                        if let Ok(t) = value.parse() {
                            template.temperature = t;
                        }
                    }
                    "max_tokens" => {
                        if let Ok(n) = value.parse() {
                            template.max_tokens = n;
                        }
                    }
                    _ => {}
                }
            }
        }

        if let Some((_, after)) = content.split_once(SYSTEM_PROMPT_HEADING) {
            let prompt = YAML_BLOCK.replace_all(after, "");
            let prompt = prompt.trim();
            if !prompt.is_empty() {
                template.system_prompt = prompt.to_string();
            }
        }

        template
    }
}
