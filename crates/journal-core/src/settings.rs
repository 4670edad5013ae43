//! Runtime settings for the journal services.
//!
//! Precedence: environment (`JOURNAL__*`) > config file (`JOURNAL_CONFIG`, default
//! `config/journal.toml`) > built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Settings consumed by the gateway and the core services.
///
/// | Key | Default | Description |
/// |-----|---------|-------------|
/// | host | 127.0.0.1 | Bind address. |
/// | port | 3001 | HTTP port. |
/// | data_dir | ./data | Root of user maps and journal files. |
/// | configs_dir | ./configs | One `<tenant>.json` per tenant. |
/// | prompts_dir | ./prompts | Prompt templates (`<name>.md`). |
/// | default_tenant | social | Fallback tenant for unknown identifiers. |
/// | config_cache_ttl_secs | 300 | Tenant config cache window. |
/// | cors_origin | http://localhost:3000 | Allowed browser origin. |
/// | llm_base_url | https://openrouter.ai/api/v1 | OpenAI-compatible endpoint. |
/// | feedback_history_limit | 20 | Interactions sent to the LLM as context. |
/// | feedback_queue_capacity | 256 | Pending feedback jobs before new ones are dropped. |
/// | log_dir | unset | When set, logs are also written to a daily rolling file. |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub configs_dir: PathBuf,
    pub prompts_dir: PathBuf,
    pub default_tenant: String,
    pub config_cache_ttl_secs: u64,
    pub cors_origin: String,
    pub llm_base_url: String,
    #[serde(default)]
    pub llm_api_key: Option<String>,
    pub feedback_history_limit: usize,
    pub feedback_queue_capacity: usize,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            data_dir: PathBuf::from("./data"),
            configs_dir: PathBuf::from("./configs"),
            prompts_dir: PathBuf::from("./prompts"),
            default_tenant: "social".to_string(),
            config_cache_ttl_secs: 300,
            cors_origin: "http://localhost:3000".to_string(),
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_api_key: None,
            feedback_history_limit: 20,
            feedback_queue_capacity: 256,
            log_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from file and environment, then apply the OpenRouter env overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("JOURNAL_CONFIG").unwrap_or_else(|_| "config/journal.toml".to_string());
        let mut settings = Self::load_from(Path::new(&config_path))?;
        settings.apply_llm_env();
        Ok(settings)
    }

    /// Load from an explicit file path (skipped when absent) layered over defaults and `JOURNAL__*` env.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let d = Settings::default();
        let builder = config::Config::builder()
            .set_default("host", d.host.as_str())?
            .set_default("port", i64::from(d.port))?
            .set_default("data_dir", "./data")?
            .set_default("configs_dir", "./configs")?
            .set_default("prompts_dir", "./prompts")?
            .set_default("default_tenant", d.default_tenant.as_str())?
            .set_default("config_cache_ttl_secs", d.config_cache_ttl_secs as i64)?
            .set_default("cors_origin", d.cors_origin.as_str())?
            .set_default("llm_base_url", d.llm_base_url.as_str())?
            .set_default("feedback_history_limit", d.feedback_history_limit as i64)?
            .set_default("feedback_queue_capacity", d.feedback_queue_capacity as i64)?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        builder
            .add_source(config::Environment::with_prefix("JOURNAL").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// API key and base URL from the conventional OpenRouter variables, when not set explicitly.
    fn apply_llm_env(&mut self) {
        if self.llm_api_key.is_none() {
            self.llm_api_key = env_opt_string("OPENROUTER_API_KEY")
                .or_else(|| env_opt_string("JOURNAL_LLM_API_KEY"));
        }
        if let Some(url) = env_opt_string("OPENROUTER_BASE_URL") {
            self.llm_base_url = url;
        }
    }

    pub fn config_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config_cache_ttl_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
