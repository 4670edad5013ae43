//! Tenant configuration document as stored in `<configs_dir>/<tenant>.json`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PROMPT_TEMPLATE: &str = "general";
pub const DEFAULT_THEME_BACKGROUND: &str = "from-blue-50 to-purple-50";
pub const DEFAULT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionType {
    pub id: String,
    pub label: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComfortLevel {
    pub id: String,
    pub label: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary: String,
    pub secondary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// UI text overrides. Absent fields are filled by [`UiText::fill_defaults`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comfort_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_button: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_entries_title: Option<String>,
}

impl UiText {
    pub fn fill_defaults(&mut self) {
        fn fill(slot: &mut Option<String>, value: &str) {
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }
        fill(&mut self.welcome_message, "Welcome back, {userName}");
        fill(&mut self.interaction_prompt, "What did you do?");
        fill(&mut self.comfort_prompt, "How did you feel?");
        fill(&mut self.notes_prompt, "Add notes (optional)");
        fill(&mut self.notes_placeholder, "Any thoughts...");
        fill(&mut self.submit_button, "Save Entry");
        fill(&mut self.recent_entries_title, "Your Recent Entries");
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// A tenant's resolved configuration: labels, theme, UI text and AI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    pub app_id: String,
    pub app_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub interactions: Vec<InteractionType>,
    pub comfort_levels: Vec<ComfortLevel>,
    pub theme: Theme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl TenantConfig {
    /// Fill UI text, AI settings, theme background and version without overwriting present values.
    pub fn apply_defaults(&mut self) {
        self.ui.get_or_insert_with(UiText::default).fill_defaults();

        let ai = self.ai.get_or_insert_with(AiSettings::default);
        if ai.prompt_template.is_none() {
            ai.prompt_template = Some(DEFAULT_PROMPT_TEMPLATE.to_string());
        }
        if ai.enabled.is_none() {
            ai.enabled = Some(true);
        }

        if self.theme.background.is_none() {
            self.theme.background = Some(DEFAULT_THEME_BACKGROUND.to_string());
        }
        if self.version.is_none() {
            self.version = Some(DEFAULT_VERSION.to_string());
        }
    }

    pub fn prompt_template(&self) -> &str {
        self.ai
            .as_ref()
            .and_then(|ai| ai.prompt_template.as_deref())
            .unwrap_or(DEFAULT_PROMPT_TEMPLATE)
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai.as_ref().and_then(|ai| ai.enabled).unwrap_or(true)
    }
}
