use std::{
    fs,
    path::PathBuf,
};

use async_trait::async_trait;
use serde::{
    de::DeserializeOwned,
    Deserialize,
    Serialize,
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

const APP_NAME: &str = "fukushu";
const SETTINGS_FILE: &str = "settings.json";
const LIBRARY_FILE: &str = "library.json";

/// The whole anonymous-mode data set: one document, always rewritten in full.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LocalLibrary {
    pub lessons: Vec<Lesson>,
    pub items: Vec<ReviewItem>,
}

/// File-backed store in the app data directory. Each data kind lives in one
/// JSON file and every write is a whole-document overwrite, so all updates
/// are read-modify-write against the full document.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new() -> Self {
        let dir = if let Some(data_dir) = dirs::data_local_dir() {
            data_dir.join(APP_NAME)
        } else {
            PathBuf::from(".")
        };
        let _ = fs::create_dir_all(&dir);
        LocalStore { dir }
    }

    /// Store rooted at an explicit directory instead of the app data dir.
    pub fn with_dir(dir: PathBuf) -> Self {
        let _ = fs::create_dir_all(&dir);
        LocalStore { dir }
    }

    fn data_file_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    fn save_json<T: Serialize>(&self, data: &T, filename: &str) -> Result<(), FukushuError> {
        let file_path = self.data_file_path(filename);
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&file_path, json)?;
        Ok(())
    }

    fn load_json<T: DeserializeOwned + Default>(&self, filename: &str) -> Result<T, FukushuError> {
        let file_path = self.data_file_path(filename);

        if !file_path.exists() {
            return Ok(T::default());
        }

        let json = fs::read_to_string(&file_path)?;
        let data: T = serde_json::from_str(&json)?;
        Ok(data)
    }

    /// A corrupt or unreadable file falls back to the default data set; local
    /// load failures are never surfaced.
    fn load_json_or_default<T: DeserializeOwned + Default>(&self, filename: &str) -> T {
        match self.load_json::<T>(filename) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Failed to load {}: {}. Using defaults.", filename, e);
                T::default()
            }
        }
    }

    pub fn load_settings_or_default(&self) -> Settings {
        self.load_json_or_default(SETTINGS_FILE)
    }

    pub fn write_settings(&self, settings: &Settings) -> Result<(), FukushuError> {
        self.save_json(settings, SETTINGS_FILE)
    }

    pub fn load_library(&self) -> LocalLibrary {
        self.load_json_or_default(LIBRARY_FILE)
    }

    pub fn save_library(&self, library: &LocalLibrary) -> Result<(), FukushuError> {
        self.save_json(library, LIBRARY_FILE)
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        LocalStore::new()
    }
}

#[async_trait]
impl ReviewStore for LocalStore {
    async fn load_settings(&self) -> Result<Option<Settings>, FukushuError> {
        if !self.data_file_path(SETTINGS_FILE).exists() {
            return Ok(None);
        }
        Ok(Some(self.load_settings_or_default()))
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), FukushuError> {
        self.write_settings(settings)
    }

    async fn archive_lesson(&self, lesson: &Lesson, now: i64) -> Result<bool, FukushuError> {
        let mut library = self.load_library();

        if library.lessons.iter().any(|existing| existing.id == lesson.id) {
            return Ok(false);
        }

        library.lessons.push(lesson.clone());
        library.items.extend(ReviewItem::from_lesson(lesson, now));
        self.save_library(&library)?;
        Ok(true)
    }

    async fn due_items(&self, now: i64) -> Result<Vec<ReviewItem>, FukushuError> {
        let library = self.load_library();
        Ok(library.items.into_iter().filter(|item| item.due_at <= now).collect())
    }

    async fn update_item(&self, item: &ReviewItem) -> Result<(), FukushuError> {
        let mut library = self.load_library();
        if let Some(slot) = library.items.iter_mut().find(|existing| existing.id == item.id) {
            *slot = item.clone();
            self.save_library(&library)?;
        }
        Ok(())
    }
}
