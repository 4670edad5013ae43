//! Tenant configuration endpoints.

use crate::api::{ApiError, ApiResponse};
use crate::app::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use contact_journal_core::{JournalError, TenantConfig};
use std::sync::Arc;

/// GET /api/config/:appId
pub async fn get_config(
    State(state): State<Arc<AppState>>,
    Path(app_id): Path<String>,
) -> Result<Json<ApiResponse<TenantConfig>>, ApiError> {
    let config = state
        .configs
        .resolve(&app_id)
        .await
        .map_err(|e| ApiError::from_journal(e, "Failed to load configuration"))?;
    Ok(ApiResponse::ok(config.as_ref().clone()))
}

/// GET /api/config
pub async fn list_configs(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<String>>> {
    ApiResponse::ok(state.configs.list_configs().await)
}

/// POST /api/config/cache/clear
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<ApiResponse<()>> {
    state.configs.clear_cache();
    ApiResponse::message("Configuration cache cleared")
}

/// GET /api/config/health/check
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    match state.configs.health_check().await {
        Ok(config) => {
            tracing::debug!(tenant = %config.app_id, "config health check passed");
            Ok(ApiResponse::message("Configuration service is healthy"))
        }
        Err(e) => {
            tracing::error!("config health check failed: {}", e);
            let detail = match &e {
                JournalError::Validation { message, .. } => message.clone(),
                other => other.to_string(),
            };
            Err(
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Configuration service is unhealthy")
                    .with_details(serde_json::Value::String(detail)),
            )
        }
    }
}
