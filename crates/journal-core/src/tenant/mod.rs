//! Per-tenant configuration: document types, validation rules and the caching resolver.

mod resolver;
mod types;
mod validate;

pub use resolver::{tenant_id_from_identifier, ConfigService};
pub(crate) use resolver::{is_safe_id, tenant_data_path};
pub use types::{
    AiSettings, ComfortLevel, InteractionType, TenantConfig, Theme, UiText,
    DEFAULT_PROMPT_TEMPLATE, DEFAULT_THEME_BACKGROUND, DEFAULT_VERSION,
};
pub use validate::{collect_problems, validate_document};
