use async_trait::async_trait;

use crate::{
    core::{
        FukushuError,
        JlptLevel,
        Lesson,
        Settings,
    },
    storage::{
        Identity,
        StorageGateway,
    },
};

/// Boundary to the lesson-generation collaborator. Prompting and response
/// parsing live behind it; this side only needs a lesson with a stable id and
/// ordered vocabulary fragments.
#[async_trait]
pub trait LessonSource: Send + Sync {
    async fn generate(
        &self,
        topic: &str,
        level: JlptLevel,
        settings: &Settings,
    ) -> Result<Lesson, FukushuError>;
}

pub struct ArchivedLesson {
    pub lesson: Lesson,
    /// False when the lesson id was already archived and nothing was written.
    pub newly_archived: bool,
}

/// Produce a lesson and archive it, turning its vocabulary into review items.
/// Generation failures and (remote-mode) archive failures both surface here.
pub async fn generate_and_archive(
    source: &dyn LessonSource,
    gateway: &StorageGateway,
    identity: &Identity,
    topic: &str,
    level: JlptLevel,
    now: i64,
) -> Result<ArchivedLesson, FukushuError> {
    let settings = gateway.load_settings(identity).await;
    let lesson = source.generate(topic, level, &settings).await?;
    let newly_archived = gateway.archive_lesson(identity, &lesson, now).await?;
    Ok(ArchivedLesson { lesson, newly_archived })
}
