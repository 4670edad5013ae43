//! Contact Journal core library.
//!
//! Tenant configuration resolution (validation, defaulting, TTL cache), the append-only
//! per-user journal, the read-only user directory and detached AI feedback generation.

pub mod error;
pub mod feedback;
pub mod journal;
pub mod settings;
pub mod tenant;
pub mod users;

pub use error::{FeedbackError, FieldProblem, JournalError, JournalResult};
pub use feedback::{FeedbackDispatcher, FeedbackGenerator, FeedbackJob, FeedbackModel, OpenRouterBridge};
pub use journal::{FeedbackRecord, InsightType, InteractionRecord, JournalRecord, JournalStore, StorageScope};
pub use settings::Settings;
pub use tenant::{tenant_id_from_identifier, ConfigService, TenantConfig};
pub use users::{User, UserDirectory, UserMap};

/// Crate version, logged by the gateway at startup.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
