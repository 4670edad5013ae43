//! Storage partitioning: tenant-scoped subtree or the shared legacy layout.

use crate::error::{FieldProblem, JournalError, JournalResult};
use crate::tenant::{is_safe_id, tenant_data_path};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a user's journal and user map live.
///
/// `Global` is the backward-compatible layout used when no tenant is named:
/// `<data>/users.json` and `<data>/interactions/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageScope {
    Global,
    Tenant(String),
}

impl StorageScope {
    /// Resolve the optional `appId` of a request. Blank means `Global`.
    pub fn from_app_id(app_id: Option<&str>) -> JournalResult<Self> {
        match app_id.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(StorageScope::Global),
            Some(id) if is_safe_id(id) => Ok(StorageScope::Tenant(id.to_string())),
            Some(id) => Err(JournalError::validation(
                format!("Invalid appId: {id}"),
                vec![FieldProblem::new("appId", "App ID may only contain letters, digits, '-' and '_'")],
            )),
        }
    }

    pub fn tenant_id(&self) -> Option<&str> {
        match self {
            StorageScope::Global => None,
            StorageScope::Tenant(id) => Some(id),
        }
    }

    fn root(&self, data_dir: &Path) -> PathBuf {
        match self {
            StorageScope::Global => data_dir.to_path_buf(),
            StorageScope::Tenant(id) => tenant_data_path(data_dir, id),
        }
    }

    pub fn interactions_dir(&self, data_dir: &Path) -> PathBuf {
        self.root(data_dir).join("interactions")
    }

    pub fn users_file(&self, data_dir: &Path) -> PathBuf {
        self.root(data_dir).join("users.json")
    }
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageScope::Global => f.write_str("global"),
            StorageScope::Tenant(id) => write!(f, "tenant:{id}"),
        }
    }
}
