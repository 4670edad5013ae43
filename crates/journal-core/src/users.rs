//! Read-only user directory. Users are provisioned out of band into `users.json` maps.

use crate::journal::StorageScope;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub created: String,
}

/// User key → user, as stored on disk.
pub type UserMap = BTreeMap<String, User>;

pub struct UserDirectory {
    data_dir: PathBuf,
}

impl UserDirectory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The whole map for a scope. Missing or corrupt files read as empty; a malformed entry
    /// is skipped without affecting the others.
    pub async fn users(&self, scope: &StorageScope) -> UserMap {
        let path = scope.users_file(&self.data_dir);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return UserMap::new(),
            Err(e) => {
                tracing::error!(path = %path.display(), "error reading users file: {}", e);
                return UserMap::new();
            }
        };
        let entries: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(path = %path.display(), "error parsing users file: {}", e);
                return UserMap::new();
            }
        };
        entries
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_value::<User>(value) {
                Ok(user) => Some((key, user)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), user = %key, "skipping malformed user entry: {}", e);
                    None
                }
            })
            .collect()
    }

    pub async fn get(&self, scope: &StorageScope, user_key: &str) -> Option<User> {
        self.users(scope).await.remove(user_key)
    }

    /// Global map first, then the tenant's own map.
    pub async fn find(&self, user_key: &str, scope: &StorageScope) -> Option<User> {
        if let Some(user) = self.get(&StorageScope::Global, user_key).await {
            return Some(user);
        }
        match scope {
            StorageScope::Global => None,
            tenant => self.get(tenant, user_key).await,
        }
    }
}
