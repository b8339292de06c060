use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};

use crate::core::models::Lesson;

/// Highest spaced-repetition stage. A ceiling, not a terminal state.
pub const MAX_LEVEL: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Vocab,
    Grammar,
}

/// One reviewable fact. `content` is the lesson fragment it was cut from and
/// stays opaque here; scheduling only ever touches `level` and `due_at`.
///
/// Wire names (`type`, `srs_level`, `next_review`) match the persisted
/// document schema shared with the app frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub content: serde_json::Value,
    #[serde(rename = "srs_level", default, deserialize_with = "clamped_level")]
    pub level: u8,
    #[serde(rename = "next_review", default)]
    pub due_at: i64,
}

/// Out-of-range levels in stored documents are clamped instead of failing the
/// whole item set; a missing field reads as 0 via the serde default.
fn clamped_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, MAX_LEVEL as i64) as u8)
}

/// Deterministic item id. Re-archiving the same lesson derives the same ids,
/// so duplicate archival can only overwrite, never duplicate.
pub fn vocab_item_id(lesson_id: &str, index: usize) -> String {
    format!("vocab-{}-{}", lesson_id, index)
}

impl ReviewItem {
    /// Expand a lesson into review items: one per vocabulary fragment, in
    /// order, at level 0 and due immediately. Both storage backends archive
    /// through this single expansion.
    pub fn from_lesson(lesson: &Lesson, now: i64) -> Vec<ReviewItem> {
        lesson
            .vocabulary
            .iter()
            .enumerate()
            .map(|(index, vocab)| ReviewItem {
                id: vocab_item_id(&lesson.id, index),
                kind: ItemKind::Vocab,
                content: serde_json::to_value(vocab).unwrap_or(serde_json::Value::Null),
                level: 0,
                due_at: now,
            })
            .collect()
    }
}
