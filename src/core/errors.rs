use thiserror::Error;

#[derive(Error, Debug)]
pub enum FukushuError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("Sync server error: {0}")]
    RemoteApi(String),

    #[error("Archive batch failed: {0}")]
    ArchiveFailed(String),

    #[error("FukushuError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for FukushuError {
    fn from(error: std::io::Error) -> Self {
        FukushuError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for FukushuError {
    fn from(error: reqwest::Error) -> Self {
        FukushuError::Reqwest(Box::new(error))
    }
}
