use super::{
    engine::{
        grade,
        ReviewQuality,
        ReviewQueue,
    },
    item::ReviewItem,
};
use crate::{
    core::FukushuError,
    storage::{
        Identity,
        StorageGateway,
    },
};

/// One grading session: the due set is snapshotted into a queue at start and
/// consumed strictly front-to-back. Grading the current item persists the new
/// schedule before the session advances, so an interrupted session loses at
/// most the item currently on screen.
pub struct ReviewSession<'a> {
    gateway: &'a StorageGateway,
    identity: Identity,
    queue: ReviewQueue,
}

impl<'a> ReviewSession<'a> {
    pub async fn start(
        gateway: &'a StorageGateway,
        identity: Identity,
        now: i64,
    ) -> Result<ReviewSession<'a>, FukushuError> {
        let due = gateway.due_items(&identity, now).await?;
        Ok(ReviewSession { gateway, identity, queue: ReviewQueue::build(due, now) })
    }

    /// The item currently up for review, if any.
    pub fn current(&self) -> Option<&ReviewItem> {
        self.queue.peek()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    /// Grade the front item, persist its new schedule, and advance. Returns
    /// the graded item, or `None` when the session is already finished.
    pub async fn grade_current(
        &mut self,
        quality: ReviewQuality,
        now: i64,
    ) -> Result<Option<ReviewItem>, FukushuError> {
        let item = match self.queue.pop() {
            Some(item) => item,
            None => return Ok(None),
        };

        let graded = grade(&item, quality, now);
        self.gateway.update_item(&self.identity, &graded).await?;
        Ok(Some(graded))
    }
}
