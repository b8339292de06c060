use async_trait::async_trait;

use self::api::{
    DocumentWrite,
    SyncClient,
};
use super::ReviewStore;
use crate::{
    core::{
        FukushuError,
        Lesson,
        Settings,
    },
    srs::item::ReviewItem,
};

pub mod api;

pub const SETTINGS_COLLECTION: &str = "settings";
pub const SETTINGS_DOC_ID: &str = "general";
pub const LESSONS_COLLECTION: &str = "lessons";
pub const ITEMS_COLLECTION: &str = "srs_items";
const DUE_FIELD: &str = "next_review";

/// Remote backend for identified callers: per-account document collections on
/// the sync server. Last writer wins per document id; no conflict resolution
/// beyond that.
pub struct RemoteStore {
    client: SyncClient,
}

impl RemoteStore {
    pub fn new(base_url: &str, account: &str) -> Self {
        RemoteStore { client: SyncClient::new(base_url, account) }
    }

    /// The full batch for one archival: the lesson document plus one item
    /// document per vocabulary fragment. Committed atomically.
    fn archive_writes(lesson: &Lesson, now: i64) -> Result<Vec<DocumentWrite>, FukushuError> {
        let mut writes = vec![DocumentWrite {
            collection: LESSONS_COLLECTION.to_string(),
            id: lesson.id.clone(),
            data: serde_json::to_value(lesson)?,
        }];

        for item in ReviewItem::from_lesson(lesson, now) {
            writes.push(DocumentWrite {
                collection: ITEMS_COLLECTION.to_string(),
                id: item.id.clone(),
                data: serde_json::to_value(&item)?,
            });
        }

        Ok(writes)
    }
}

#[async_trait]
impl ReviewStore for RemoteStore {
    async fn load_settings(&self) -> Result<Option<Settings>, FukushuError> {
        match self.client.get_document(SETTINGS_COLLECTION, SETTINGS_DOC_ID).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), FukushuError> {
        self.client
            .set_document(
                SETTINGS_COLLECTION,
                SETTINGS_DOC_ID,
                serde_json::to_value(settings)?,
                false,
            )
            .await
    }

    async fn archive_lesson(&self, lesson: &Lesson, now: i64) -> Result<bool, FukushuError> {
        // Same pre-check as the local store, so both modes skip an already
        // archived id instead of re-issuing the batch.
        if self.client.get_document(LESSONS_COLLECTION, &lesson.id).await?.is_some() {
            return Ok(false);
        }

        let writes = Self::archive_writes(lesson, now)?;
        self.client
            .commit_batch(writes)
            .await
            .map_err(|e| FukushuError::ArchiveFailed(e.to_string()))?;
        Ok(true)
    }

    async fn due_items(&self, now: i64) -> Result<Vec<ReviewItem>, FukushuError> {
        let docs = self.client.query_leq(ITEMS_COLLECTION, DUE_FIELD, now).await?;

        // One malformed document must not reject the whole set.
        let mut items = Vec::with_capacity(docs.len());
        for doc in docs {
            match serde_json::from_value::<ReviewItem>(doc) {
                Ok(item) => items.push(item),
                Err(e) => eprintln!("Skipping malformed review item document: {}", e),
            }
        }
        Ok(items)
    }

    async fn update_item(&self, item: &ReviewItem) -> Result<(), FukushuError> {
        self.client
            .set_document(ITEMS_COLLECTION, &item.id, serde_json::to_value(item)?, true)
            .await
    }
}
