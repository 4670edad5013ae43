//! Feedback generation for a freshly logged interaction.

use crate::error::FeedbackError;
use crate::feedback::openrouter::{CompletionRequest, FeedbackModel};
use crate::feedback::prompt::PromptTemplate;
use crate::journal::{FeedbackRecord, InsightType, InteractionRecord, JournalRecord, JournalStore, StorageScope};
use crate::tenant::{ConfigService, DEFAULT_PROMPT_TEMPLATE};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Substituted when the model answers without a `feedback` field.
pub const DEFAULT_FEEDBACK: &str = "Keep going - every interaction is progress!";

/// Everything needed to produce feedback for one interaction.
#[derive(Debug, Clone)]
pub struct FeedbackJob {
    pub user_key: String,
    pub user_name: String,
    pub scope: StorageScope,
    pub interaction: InteractionRecord,
}

pub struct FeedbackGenerator {
    store: Arc<JournalStore>,
    configs: Arc<ConfigService>,
    model: Option<Arc<dyn FeedbackModel>>,
    prompts_dir: PathBuf,
    history_limit: usize,
}

impl FeedbackGenerator {
    pub fn new(
        store: Arc<JournalStore>,
        configs: Arc<ConfigService>,
        model: Option<Arc<dyn FeedbackModel>>,
        prompts_dir: impl Into<PathBuf>,
        history_limit: usize,
    ) -> Self {
        Self {
            store,
            configs,
            model,
            prompts_dir: prompts_dir.into(),
            history_limit,
        }
    }

    /// Generate and persist feedback. `Ok(None)` when generation is skipped
    /// (no model configured, or AI disabled for the tenant).
    pub async fn generate(&self, job: &FeedbackJob) -> Result<Option<FeedbackRecord>, FeedbackError> {
        let Some(template_name) = self.template_for(&job.scope).await else {
            tracing::debug!(user = %job.user_key, scope = %job.scope, "AI feedback disabled for tenant");
            return Ok(None);
        };

        let Some(model) = self.model.as_ref() else {
            tracing::info!(user = %job.user_key, "AI feedback skipped: no API key configured");
            return Ok(None);
        };

        let template = PromptTemplate::load(&self.prompts_dir, &template_name).await;

        let history: Vec<InteractionRecord> = self
            .store
            .read_all(&job.scope, &job.user_key)
            .await?
            .into_iter()
            .filter_map(|r| match r {
                JournalRecord::Interaction(i) => Some(i),
                JournalRecord::Feedback(_) => None,
            })
            .collect();
        let skip = history.len().saturating_sub(self.history_limit);
        let recent = &history[skip..];

        let request = CompletionRequest {
            model: template.model.clone(),
            temperature: template.temperature,
            max_tokens: template.max_tokens,
            system: template.system_prompt.clone(),
            user: build_user_message(&job.user_name, recent, &job.interaction),
        };

        let content = model.complete(&request).await?;
        let (feedback, insight_type) = parse_feedback(&content)?;

        let record = FeedbackRecord::new(vec![job.interaction.id.clone()], feedback, insight_type);
        self.store
            .append(&job.scope, &job.user_key, &JournalRecord::Feedback(record.clone()))
            .await?;

        tracing::info!(
            user = %job.user_key,
            scope = %job.scope,
            template = %template_name,
            "AI feedback generated: {}",
            record.feedback
        );
        Ok(Some(record))
    }

    /// Prompt template for a scope; `None` when the tenant disabled AI feedback.
    async fn template_for(&self, scope: &StorageScope) -> Option<String> {
        let Some(tenant_id) = scope.tenant_id() else {
            return Some(DEFAULT_PROMPT_TEMPLATE.to_string());
        };
        match self.configs.resolve(tenant_id).await {
            Ok(config) if !config.ai_enabled() => None,
            Ok(config) => Some(config.prompt_template().to_string()),
            Err(e) => {
                tracing::warn!(tenant = tenant_id, "could not load config ({}), using general prompt", e);
                Some(DEFAULT_PROMPT_TEMPLATE.to_string())
            }
        }
    }
}

/// User message: recent history, then the interaction that was just logged.
pub fn build_user_message(
    user_name: &str,
    recent: &[InteractionRecord],
    new_interaction: &InteractionRecord,
) -> String {
    let summary = if recent.is_empty() {
        "No previous interactions".to_string()
    } else {
        recent
            .iter()
            .map(|i| match i.notes.as_deref() {
                Some(notes) => format!("- {} ({}) - \"{}\"", i.interaction_type, i.comfort_level, notes),
                None => format!("- {} ({})", i.interaction_type, i.comfort_level),
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "User: {user_name}\n\n\
         Recent interactions (last {count}):\n{summary}\n\n\
         New interaction just entered:\n\
         - Type: {kind}\n\
         - Comfort Level: {comfort}\n\
         - Notes: {notes}\n\n\
         Please provide encouraging feedback following the guidelines. Return response as JSON.",
        count = recent.len(),
        kind = new_interaction.interaction_type,
        comfort = new_interaction.comfort_level,
        notes = new_interaction.notes.as_deref().unwrap_or("None"),
    )
}

/// Interpret model output as `{feedback, insightType}`. Missing fields get defaults;
/// content that is not a JSON object is an error.
pub fn parse_feedback(content: &str) -> Result<(String, InsightType), FeedbackError> {
    let trimmed = strip_code_fence(content.trim());
    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| FeedbackError::MalformedResponse(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| FeedbackError::MalformedResponse("expected a JSON object".to_string()))?;

    let feedback = obj
        .get("feedback")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let Some(feedback) = feedback else {
        tracing::warn!("AI response missing feedback field, using default message");
        return Ok((DEFAULT_FEEDBACK.to_string(), InsightType::Encouragement));
    };

    let insight_type = obj
        .get("insightType")
        .and_then(Value::as_str)
        .and_then(InsightType::parse)
        .unwrap_or_default();

    Ok((feedback.to_string(), insight_type))
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interaction(kind: &str, comfort: &str, notes: Option<&str>) -> InteractionRecord {
        InteractionRecord::new(kind, comfort, notes.map(str::to_string))
    }

    #[test]
    fn user_message_lists_history_and_new_entry() {
        let history = vec![
            interaction("Met New Person", "Neutral", None),
            interaction("Did a Favor", "Comfortable", Some("helped a neighbour")),
        ];
        let new = interaction("Listened Intently", "Very Comfortable", None);
        let msg = build_user_message("Sam", &history, &new);

        assert!(msg.starts_with("User: Sam\n"));
        assert!(msg.contains("Recent interactions (last 2):"));
        assert!(msg.contains("- Did a Favor (Comfortable) - \"helped a neighbour\""));
        assert!(msg.contains("- Type: Listened Intently"));
        assert!(msg.contains("- Notes: None"));
    }

    #[test]
    fn empty_history_is_spelled_out() {
        let msg = build_user_message("Sam", &[], &interaction("Met New Person", "Neutral", None));
        assert!(msg.contains("No previous interactions"));
    }

    #[test]
    fn parse_feedback_variants() {
        let (text, kind) =
            parse_feedback(r#"{"feedback":"Great step!","insightType":"milestone"}"#).unwrap();
        assert_eq!(text, "Great step!");
        assert_eq!(kind, InsightType::Milestone);

        let (text, kind) = parse_feedback(r#"{"insightType":"suggestion"}"#).unwrap();
        assert_eq!(text, DEFAULT_FEEDBACK);
        assert_eq!(kind, InsightType::Encouragement);

        let (_, kind) = parse_feedback("```json\n{\"feedback\":\"ok\",\"insightType\":\"cheer\"}\n```").unwrap();
        assert_eq!(kind, InsightType::Encouragement);

        assert!(matches!(
            parse_feedback("Well done!"),
            Err(FeedbackError::MalformedResponse(_))
        ));
    }
}
