pub mod errors;
pub mod models;
pub mod settings;
pub mod utils;

pub use errors::FukushuError;
pub use models::{
    FuriganaSegment,
    GrammarPoint,
    JlptLevel,
    Lesson,
    VocabFragment,
};
pub use settings::Settings;
