//! Read-only user lookups.

use crate::api::{ApiError, ApiResponse};
use crate::app::AppState;
use crate::handlers::ScopeQuery;
use axum::extract::{Path, Query, State};
use axum::Json;
use contact_journal_core::{StorageScope, UserMap};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub user_key: String,
    pub name: String,
    pub created: String,
}

/// GET /api/users/:userKey
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_key): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let scope = StorageScope::from_app_id(query.app_id.as_deref())?;
    let user = state
        .users
        .find(&user_key, &scope)
        .await
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::ok(UserView {
        user_key,
        name: user.name,
        created: user.created,
    }))
}

/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ApiResponse<UserMap>>, ApiError> {
    let scope = StorageScope::from_app_id(query.app_id.as_deref())?;
    Ok(ApiResponse::ok(state.users.users(&scope).await))
}
