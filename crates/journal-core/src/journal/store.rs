//! Append-only JSONL journal: one file per user per scope.
//!
//! No locking and no compaction. A corrupt line costs that line only; a missing or unreadable
//! file reads as an empty history.

use crate::error::{FieldProblem, JournalError, JournalResult};
use crate::journal::record::{InteractionRecord, JournalRecord};
use crate::journal::scope::StorageScope;
use crate::tenant::is_safe_id;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

pub struct JournalStore {
    data_dir: PathBuf,
}

impl JournalStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path of a user's log file within a scope. Rejects keys that are not plain file stems.
    pub fn journal_path(&self, scope: &StorageScope, user_key: &str) -> JournalResult<PathBuf> {
        if !is_safe_id(user_key) {
            return Err(JournalError::validation(
                format!("Invalid user key: {user_key}"),
                vec![FieldProblem::new(
                    "userKey",
                    "User key may only contain letters, digits, '-' and '_'",
                )],
            ));
        }
        Ok(scope
            .interactions_dir(&self.data_dir)
            .join(format!("{user_key}.jsonl")))
    }

    /// Serialize `record` as one line and append it, creating parent directories if needed.
    pub async fn append(
        &self,
        scope: &StorageScope,
        user_key: &str,
        record: &JournalRecord,
    ) -> JournalResult<()> {
        let path = self.journal_path(scope, user_key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(user = user_key, %scope, id = record.id(), "journal record appended");
        Ok(())
    }

    /// Every parseable record in file order.
    pub async fn read_all(
        &self,
        scope: &StorageScope,
        user_key: &str,
    ) -> JournalResult<Vec<JournalRecord>> {
        let path = self.journal_path(scope, user_key)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                tracing::error!(path = %path.display(), "journal read failed, treating as empty: {}", e);
                return Ok(Vec::new());
            }
        };
        Ok(parse_lines(&content, user_key))
    }

    /// Last `limit` interaction records, most recent first. Feedback records are skipped.
    pub async fn recent(
        &self,
        scope: &StorageScope,
        user_key: &str,
        limit: usize,
    ) -> JournalResult<Vec<InteractionRecord>> {
        let records = self.read_all(scope, user_key).await?;
        Ok(records
            .into_iter()
            .filter_map(|r| match r {
                JournalRecord::Interaction(i) => Some(i),
                JournalRecord::Feedback(_) => None,
            })
            .rev()
            .take(limit)
            .collect())
    }

    /// All records with a timestamp at or after `threshold`, in file order.
    pub async fn since(
        &self,
        scope: &StorageScope,
        user_key: &str,
        threshold: DateTime<Utc>,
    ) -> JournalResult<Vec<JournalRecord>> {
        let records = self.read_all(scope, user_key).await?;
        Ok(records
            .into_iter()
            .filter(|r| r.timestamp_utc().is_some_and(|ts| ts >= threshold))
            .collect())
    }
}

fn parse_lines(content: &str, user_key: &str) -> Vec<JournalRecord> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .filter_map(|(index, line)| match serde_json::from_str::<JournalRecord>(line) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(user = user_key, line = index + 1, "skipping unparseable journal line: {}", e);
                None
            }
        })
        .collect()
}
