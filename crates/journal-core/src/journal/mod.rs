//! Per-user append-only journals.

mod record;
mod scope;
mod store;

pub use record::{FeedbackRecord, InsightType, InteractionRecord, JournalRecord};
pub use scope::StorageScope;
pub use store::JournalStore;
