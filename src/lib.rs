pub mod content;
pub mod core;
pub mod srs;
pub mod storage;

pub use crate::{
    core::{
        errors::FukushuError,
        models::{
            FuriganaSegment,
            GrammarPoint,
            JlptLevel,
            Lesson,
            VocabFragment,
        },
        settings::Settings,
        utils::now_ms,
    },
    srs::{
        grade,
        ItemKind,
        ReviewItem,
        ReviewQuality,
        ReviewQueue,
        ReviewSession,
    },
    storage::{
        Identity,
        LocalStore,
        RemoteStore,
        ReviewStore,
        StorageGateway,
    },
};
