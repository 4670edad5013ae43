pub mod config;
pub mod interactions;
pub mod users;

use serde::Deserialize;

/// `?appId=` selects the tenant storage partition; absent means the shared layout.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    #[serde(rename = "appId", default)]
    pub app_id: Option<String>,
}
