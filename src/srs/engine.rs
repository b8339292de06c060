use std::collections::VecDeque;

use serde::{
    Deserialize,
    Serialize,
};

use super::item::{
    ReviewItem,
    MAX_LEVEL,
};

/// Days until the next presentation, indexed by level. Fixed table.
pub const INTERVAL_DAYS: [i64; 6] = [0, 1, 3, 7, 14, 30];

pub const DAY_MS: i64 = 86_400_000;

/// How well the user recalled an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewQuality {
    Hard,
    Good,
    Easy,
}

/// Apply one grading step. Pure: the input is untouched and the caller
/// persists the returned item explicitly.
///
/// `Easy` jumps two levels while `Good`/`Hard` step one, so well-known items
/// graduate faster and a single lapse does not demote all the way back to
/// the first interval.
pub fn grade(item: &ReviewItem, quality: ReviewQuality, now: i64) -> ReviewItem {
    // The final min also catches a hand-built item whose level was never
    // clamped at deserialization, keeping the interval lookup in bounds.
    let level = match quality {
        ReviewQuality::Hard => item.level.saturating_sub(1),
        ReviewQuality::Good => item.level.saturating_add(1),
        ReviewQuality::Easy => item.level.saturating_add(2),
    }
    .min(MAX_LEVEL);

    ReviewItem {
        due_at: now + INTERVAL_DAYS[level as usize] * DAY_MS,
        level,
        ..item.clone()
    }
}

/// One session's worth of due items, consumed strictly front-to-back.
///
/// Built once from a snapshot; a popped item is never re-enqueued even if its
/// freshly graded `due_at` is still in the past, otherwise a level-0 item
/// graded `Hard` would loop inside the same session forever.
#[derive(Debug, Default)]
pub struct ReviewQueue {
    items: VecDeque<ReviewItem>,
}

impl ReviewQueue {
    /// Keep the due subset (`due_at <= now`) in input order. No re-sorting:
    /// sessions are short and priority ordering buys nothing at this scale.
    pub fn build(items: Vec<ReviewItem>, now: i64) -> Self {
        ReviewQueue { items: items.into_iter().filter(|item| item.due_at <= now).collect() }
    }

    pub fn peek(&self) -> Option<&ReviewItem> {
        self.items.front()
    }

    pub fn pop(&mut self) -> Option<ReviewItem> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
