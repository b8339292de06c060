use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiModel {
    #[default]
    Gemini,
    OpenAi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtsProvider {
    #[default]
    Browser,
    GoogleCloud,
    OpenAi,
}

/// User-facing configuration. Every field has a serde default so a partial
/// document (older schema, sparse remote copy) still deserializes; absent
/// fields fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gemini_key: String,
    pub openai_key: String,
    pub google_tts_key: String,
    pub selected_model: AiModel,
    pub tts_provider: TtsProvider,
    pub user_name: String,
    /// Base URL of the account sync service. Empty disables remote sync.
    pub sync_server_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            gemini_key: String::new(),
            openai_key: String::new(),
            google_tts_key: String::new(),
            selected_model: AiModel::default(),
            tts_provider: TtsProvider::default(),
            user_name: "Guest".to_string(),
            sync_server_url: String::new(),
        }
    }
}

impl Settings {
    /// Overlay a remote copy on top of this one. The remote document wins
    /// wholesale; fields it omitted were already filled with defaults at
    /// deserialization, which matches merging remote fields over local defaults.
    pub fn merge(&mut self, remote: Settings) {
        *self = remote;
    }
}
