//! ConfigService: identifier → tenant id → validated, defaulted, cached [`TenantConfig`].
//!
//! Read failures fall back to the default tenant exactly once. Validation failures never fall back.

use crate::error::{FieldProblem, JournalError, JournalResult};
use crate::settings::Settings;
use crate::tenant::types::TenantConfig;
use crate::tenant::validate::{collect_problems, validate_document};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// File stems accepted as tenant ids and user keys. Anything else never touches the filesystem.
static SAFE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static regex"));

const SCHEMA_FILE: &str = "schema.json";

pub(crate) fn is_safe_id(id: &str) -> bool {
    SAFE_ID.is_match(id)
}

/// Derive a tenant id from a hostname (`addiction.example.com`), path segment (`/addiction`) or raw id.
pub fn tenant_id_from_identifier(identifier: &str) -> &str {
    if let Some((head, _)) = identifier.split_once('.') {
        head
    } else if let Some(rest) = identifier.strip_prefix('/') {
        rest
    } else {
        identifier
    }
}

struct CachedConfig {
    config: Arc<TenantConfig>,
    expires_at: Instant,
}

/// Why a tenant document could not be loaded. Only `Unreadable` triggers the default-tenant fallback.
enum LoadFailure {
    Unreadable(String),
    Invalid(JournalError),
}

pub struct ConfigService {
    configs_dir: PathBuf,
    data_dir: PathBuf,
    default_tenant: String,
    ttl: Duration,
    cache: DashMap<String, CachedConfig>,
}

impl ConfigService {
    pub fn new(
        configs_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        default_tenant: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            configs_dir: configs_dir.into(),
            data_dir: data_dir.into(),
            default_tenant: default_tenant.into(),
            ttl,
            cache: DashMap::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.configs_dir.clone(),
            settings.data_dir.clone(),
            settings.default_tenant.clone(),
            settings.config_cache_ttl(),
        )
    }

    pub fn default_tenant(&self) -> &str {
        &self.default_tenant
    }

    /// Resolve an identifier to its tenant config, falling back to the default tenant when the
    /// tenant's document cannot be read. `NotFound` only when the default is unreadable as well.
    pub async fn resolve(&self, identifier: &str) -> JournalResult<Arc<TenantConfig>> {
        let tenant_id = tenant_id_from_identifier(identifier);
        match self.resolve_exact(tenant_id).await {
            Ok(config) => Ok(config),
            Err(LoadFailure::Invalid(err)) => Err(err),
            Err(LoadFailure::Unreadable(reason)) if tenant_id != self.default_tenant => {
                tracing::warn!(
                    tenant = tenant_id,
                    fallback = %self.default_tenant,
                    "config not found ({}), falling back to default tenant",
                    reason
                );
                match self.resolve_exact(&self.default_tenant).await {
                    Ok(config) => Ok(config),
                    Err(LoadFailure::Invalid(err)) => Err(err),
                    Err(LoadFailure::Unreadable(_)) => Err(JournalError::NotFound(format!(
                        "Configuration file not found: {}.json",
                        self.default_tenant
                    ))),
                }
            }
            Err(LoadFailure::Unreadable(_)) => Err(JournalError::NotFound(format!(
                "Configuration file not found: {tenant_id}.json"
            ))),
        }
    }

    /// Cache lookup, then load + validate + default + cache. No fallback.
    async fn resolve_exact(&self, tenant_id: &str) -> Result<Arc<TenantConfig>, LoadFailure> {
        if let Some(config) = self.cached(tenant_id) {
            return Ok(config);
        }

        let doc = self.load_document(tenant_id).await?;
        let mut config = validate_document(&doc).map_err(LoadFailure::Invalid)?;
        config.apply_defaults();

        let config = Arc::new(config);
        self.cache.insert(
            tenant_id.to_string(),
            CachedConfig {
                config: Arc::clone(&config),
                expires_at: Instant::now() + self.ttl,
            },
        );
        tracing::debug!(tenant = tenant_id, "config loaded and cached");
        Ok(config)
    }

    fn cached(&self, tenant_id: &str) -> Option<Arc<TenantConfig>> {
        self.cache
            .get(tenant_id)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| Arc::clone(&entry.config))
    }

    async fn load_document(&self, tenant_id: &str) -> Result<Value, LoadFailure> {
        if !is_safe_id(tenant_id) {
            return Err(LoadFailure::Unreadable(format!(
                "invalid tenant id {tenant_id:?}"
            )));
        }
        let path = self.config_path(tenant_id);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LoadFailure::Unreadable(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| {
            LoadFailure::Invalid(JournalError::validation(
                format!("Failed to parse configuration: {tenant_id}.json"),
                vec![FieldProblem::new("$", e.to_string())],
            ))
        })
    }

    fn config_path(&self, tenant_id: &str) -> PathBuf {
        self.configs_dir.join(format!("{tenant_id}.json"))
    }

    /// Drop every cached tenant config.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("tenant config cache cleared");
    }

    /// Sorted ids of every tenant document in the config directory (`schema.json` excluded).
    pub async fn list_configs(&self) -> Vec<String> {
        let mut entries = match tokio::fs::read_dir(&self.configs_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(dir = %self.configs_dir.display(), "error listing configs: {}", e);
                return Vec::new();
            }
        };

        let mut ids = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if name == SCHEMA_FILE {
                        continue;
                    }
                    if let Some(id) = name.strip_suffix(".json") {
                        ids.push(id.to_string());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("error reading config directory entry: {}", e);
                    break;
                }
            }
        }
        ids.sort();
        ids
    }

    /// Resolves the default tenant; used by the config health endpoint.
    pub async fn health_check(&self) -> JournalResult<Arc<TenantConfig>> {
        self.resolve(&self.default_tenant).await
    }

    /// Check every tenant document on disk without caching or fallback.
    /// Returns only tenants with problems.
    pub async fn validate_all(&self) -> Vec<(String, Vec<FieldProblem>)> {
        let mut report = Vec::new();
        for tenant_id in self.list_configs().await {
            let problems = match self.load_document(&tenant_id).await {
                Ok(doc) => collect_problems(&doc),
                Err(LoadFailure::Unreadable(reason)) => vec![FieldProblem::new("$", reason)],
                Err(LoadFailure::Invalid(err)) => err.problems().to_vec(),
            };
            if !problems.is_empty() {
                report.push((tenant_id, problems));
            }
        }
        report
    }

    /// Directory where a tenant's user map and journals live.
    pub fn tenant_data_path(&self, tenant_id: &str) -> PathBuf {
        tenant_data_path(&self.data_dir, tenant_id)
    }
}

pub(crate) fn tenant_data_path(data_dir: &Path, tenant_id: &str) -> PathBuf {
    data_dir.join("apps").join(tenant_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_forms() {
        assert_eq!(tenant_id_from_identifier("addiction.example.com"), "addiction");
        assert_eq!(tenant_id_from_identifier("/addiction"), "addiction");
        assert_eq!(tenant_id_from_identifier("social"), "social");
        assert_eq!(tenant_id_from_identifier("/"), "");
    }

    #[test]
    fn safe_ids() {
        assert!(is_safe_id("addiction-recovery"));
        assert!(is_safe_id("user_01"));
        assert!(!is_safe_id("../etc/passwd"));
        assert!(!is_safe_id(""));
    }
}
