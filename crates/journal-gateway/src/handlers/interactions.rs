//! Journal endpoints: log an interaction, read history.

use crate::api::{ApiError, ApiResponse};
use crate::app::AppState;
use crate::handlers::ScopeQuery;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use contact_journal_core::{FeedbackJob, InteractionRecord, JournalRecord, StorageScope, User};
use serde::Deserialize;
use std::sync::Arc;

pub const DEFAULT_RECENT_LIMIT: usize = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInteraction {
    #[serde(default)]
    pub interaction_type: Option<String>,
    #[serde(default)]
    pub comfort_level: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(rename = "appId", default)]
    pub app_id: Option<String>,
}

/// POST /api/interactions/:userKey
///
/// The user must exist before anything touches the journal. Feedback is queued after
/// the append and never delays or fails the response.
pub async fn create_interaction(
    State(state): State<Arc<AppState>>,
    Path(user_key): Path<String>,
    payload: Result<Json<CreateInteraction>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<JournalRecord>>), ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))?;
    let scope = StorageScope::from_app_id(body.app_id.as_deref())?;

    let user = require_user(&state, &user_key, &scope).await?;

    let (interaction_type, comfort_level) = match (
        non_blank(body.interaction_type),
        non_blank(body.comfort_level),
    ) {
        (Some(kind), Some(comfort)) => (kind, comfort),
        _ => {
            return Err(ApiError::bad_request(
                "Missing required fields: interactionType, comfortLevel",
            ))
        }
    };

    let interaction = InteractionRecord::new(interaction_type, comfort_level, body.notes);
    let record = JournalRecord::Interaction(interaction.clone());
    state
        .journal
        .append(&scope, &user_key, &record)
        .await
        .map_err(|e| ApiError::from_journal(e, "Failed to save interaction"))?;
    tracing::info!(user = %user_key, scope = %scope, id = %interaction.id, "interaction logged");

    state.feedback.dispatch(FeedbackJob {
        user_key,
        user_name: user.name,
        scope,
        interaction,
    });

    Ok((StatusCode::CREATED, ApiResponse::ok(record)))
}

/// GET /api/interactions/:userKey/all
pub async fn all_records(
    State(state): State<Arc<AppState>>,
    Path(user_key): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ApiResponse<Vec<JournalRecord>>>, ApiError> {
    let scope = StorageScope::from_app_id(query.app_id.as_deref())?;
    require_user(&state, &user_key, &scope).await?;
    let records = state
        .journal
        .read_all(&scope, &user_key)
        .await
        .map_err(|e| ApiError::from_journal(e, "Failed to fetch interactions"))?;
    Ok(ApiResponse::ok(records))
}

/// GET /api/interactions/:userKey/recent
pub async fn recent(
    State(state): State<Arc<AppState>>,
    Path(user_key): Path<String>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<ApiResponse<Vec<JournalRecord>>>, ApiError> {
    let scope = StorageScope::from_app_id(query.app_id.as_deref())?;
    require_user(&state, &user_key, &scope).await?;
    let limit = parse_limit(query.limit.as_deref());
    let records = state
        .journal
        .recent(&scope, &user_key, limit)
        .await
        .map_err(|e| ApiError::from_journal(e, "Failed to fetch recent interactions"))?;
    Ok(ApiResponse::ok(records.into_iter().map(JournalRecord::from).collect()))
}

/// GET /api/interactions/:userKey/since/:date
pub async fn since(
    State(state): State<Arc<AppState>>,
    Path((user_key, date)): Path<(String, String)>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ApiResponse<Vec<JournalRecord>>>, ApiError> {
    let scope = StorageScope::from_app_id(query.app_id.as_deref())?;
    require_user(&state, &user_key, &scope).await?;
    let threshold = parse_since(&date).ok_or_else(|| ApiError::bad_request("Invalid date format"))?;
    let records = state
        .journal
        .since(&scope, &user_key, threshold)
        .await
        .map_err(|e| ApiError::from_journal(e, "Failed to fetch interactions"))?;
    Ok(ApiResponse::ok(records))
}

/// Global users first, then the scope's own map. Runs before any journal access.
async fn require_user(state: &AppState, user_key: &str, scope: &StorageScope) -> Result<User, ApiError> {
    state
        .users
        .find(user_key, scope)
        .await
        .ok_or_else(|| ApiError::not_found("User not found"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Missing, unparsable or zero limits fall back to the default.
pub fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_RECENT_LIMIT)
}

/// RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (UTC) or a bare date (UTC midnight).
pub fn parse_since(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_falls_back_to_ten() {
        assert_eq!(parse_limit(None), 10);
        assert_eq!(parse_limit(Some("abc")), 10);
        assert_eq!(parse_limit(Some("0")), 10);
        assert_eq!(parse_limit(Some("-3")), 10);
        assert_eq!(parse_limit(Some("25")), 25);
    }

    #[test]
    fn since_accepts_common_date_shapes() {
        let midnight = parse_since("2024-03-01").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        let offset = parse_since("2024-03-01T10:00:00+02:00").unwrap();
        assert_eq!(offset.to_rfc3339(), "2024-03-01T08:00:00+00:00");

        assert!(parse_since("2024-03-01T10:00:00").is_some());
        assert!(parse_since("2024-03-01T10:00:00.250").is_some());
        assert!(parse_since("not-a-date").is_none());
        assert!(parse_since("2024-13-45").is_none());
    }
}
