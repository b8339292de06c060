use async_trait::async_trait;

use crate::{
    core::{
        FukushuError,
        Lesson,
        Settings,
    },
    srs::item::ReviewItem,
};

pub mod gateway;
pub mod local;
pub mod remote;

pub use gateway::StorageGateway;
pub use local::LocalStore;
pub use remote::RemoteStore;

/// Who is asking. Selects the physical backend for a call; items themselves
/// never carry an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Account(String),
}

impl Identity {
    pub fn account_id(&self) -> Option<&str> {
        match self {
            Identity::Anonymous => None,
            Identity::Account(id) => Some(id),
        }
    }
}

/// Storage backend contract. Both the local JSON store and the remote sync
/// service implement this; everything above it is backend-agnostic.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// The stored settings document, or `None` when the store has none.
    async fn load_settings(&self) -> Result<Option<Settings>, FukushuError>;

    async fn save_settings(&self, settings: &Settings) -> Result<(), FukushuError>;

    /// Archive a lesson and its derived review items. Idempotent per lesson
    /// id: returns `true` when newly archived, `false` when the id already
    /// existed and nothing was written.
    async fn archive_lesson(&self, lesson: &Lesson, now: i64) -> Result<bool, FukushuError>;

    /// All items with `due_at <= now`.
    async fn due_items(&self, now: i64) -> Result<Vec<ReviewItem>, FukushuError>;

    /// Overwrite a single item by id.
    async fn update_item(&self, item: &ReviewItem) -> Result<(), FukushuError>;
}
