//! Journal record model: one JSON object per line, tagged by `recordType`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Classification attached to generated feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    #[default]
    Encouragement,
    Suggestion,
    Observation,
    Milestone,
}

impl InsightType {
    /// Lenient parse used on LLM output. Unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "encouragement" => Some(Self::Encouragement),
            "suggestion" => Some(Self::Suggestion),
            "observation" => Some(Self::Observation),
            "milestone" => Some(Self::Milestone),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub id: String,
    pub timestamp: String,
    pub interaction_type: String,
    pub comfort_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl InteractionRecord {
    /// New record with a generated `int_` id and the current timestamp. Blank notes are dropped.
    pub fn new(
        interaction_type: impl Into<String>,
        comfort_level: impl Into<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: format!("int_{}", uuid::Uuid::new_v4()),
            timestamp: now_timestamp(),
            interaction_type: interaction_type.into(),
            comfort_level: comfort_level.into(),
            notes: notes.filter(|n| !n.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: String,
    pub timestamp: String,
    pub related_to: Vec<String>,
    pub feedback: String,
    pub insight_type: InsightType,
}

impl FeedbackRecord {
    pub fn new(related_to: Vec<String>, feedback: impl Into<String>, insight_type: InsightType) -> Self {
        Self {
            id: format!("ai_{}", uuid::Uuid::new_v4()),
            timestamp: now_timestamp(),
            related_to,
            feedback: feedback.into(),
            insight_type,
        }
    }
}

/// One persisted event in a user's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "recordType")]
pub enum JournalRecord {
    #[serde(rename = "interaction")]
    Interaction(InteractionRecord),
    #[serde(rename = "ai_feedback")]
    Feedback(FeedbackRecord),
}

impl JournalRecord {
    pub fn id(&self) -> &str {
        match self {
            JournalRecord::Interaction(r) => &r.id,
            JournalRecord::Feedback(r) => &r.id,
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            JournalRecord::Interaction(r) => &r.timestamp,
            JournalRecord::Feedback(r) => &r.timestamp,
        }
    }

    /// Parsed timestamp; `None` when the stored value is not RFC 3339.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.timestamp())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn as_interaction(&self) -> Option<&InteractionRecord> {
        match self {
            JournalRecord::Interaction(r) => Some(r),
            JournalRecord::Feedback(_) => None,
        }
    }
}

impl From<InteractionRecord> for JournalRecord {
    fn from(record: InteractionRecord) -> Self {
        JournalRecord::Interaction(record)
    }
}

impl From<FeedbackRecord> for JournalRecord {
    fn from(record: FeedbackRecord) -> Self {
        JournalRecord::Feedback(record)
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
