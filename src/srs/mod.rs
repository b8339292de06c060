pub mod engine;
pub mod item;
pub mod session;

pub use engine::{
    grade,
    ReviewQuality,
    ReviewQueue,
    DAY_MS,
    INTERVAL_DAYS,
};
pub use item::{
    ItemKind,
    ReviewItem,
    MAX_LEVEL,
};
pub use session::ReviewSession;
