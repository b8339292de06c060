use serde::{
    Deserialize,
    Serialize,
};

use crate::core::utils::now_ms;

/// JLPT difficulty bands, hardest last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JlptLevel {
    N5,
    N4,
    N3,
    N2,
    N1,
}

/// A run of text with an optional furigana reading over it.
/// Lesson text is stored pre-segmented so the renderer never re-parses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuriganaSegment {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub furigana: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleSentence {
    pub text: Vec<FuriganaSegment>,
    pub translation: String,
    #[serde(default)]
    pub grammar_point: String,
}

/// One vocabulary entry of a lesson. Becomes exactly one review item at archival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabFragment {
    pub word: Vec<FuriganaSegment>,
    pub reading: String,
    pub meaning: String,
    #[serde(default)]
    pub grammar_tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<ExampleSentence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarPoint {
    pub point: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<ExampleSentence>,
}

/// A generated study session. Owned by the content collaborator; the SRS side
/// only relies on `id` and the order of `vocabulary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub topic: String,
    pub level: JlptLevel,
    pub title: Vec<FuriganaSegment>,
    pub vocabulary: Vec<VocabFragment>,
    #[serde(default)]
    pub grammar: Vec<GrammarPoint>,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl Lesson {
    /// Stamp freshly generated content with a stable identity and creation time.
    pub fn from_parts(
        topic: String,
        level: JlptLevel,
        title: Vec<FuriganaSegment>,
        vocabulary: Vec<VocabFragment>,
        grammar: Vec<GrammarPoint>,
    ) -> Self {
        Lesson {
            id: uuid::Uuid::new_v4().to_string(),
            topic,
            level,
            title,
            vocabulary,
            grammar,
            created_at: now_ms(),
        }
    }
}
