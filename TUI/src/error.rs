use std::path::PathBuf;

use thiserror::Error;

use crate::chat_list::ChatId;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),
    #[error("Notification failed: {0}")]
    Notification(String),
    #[error("Unknown chat {0}")]
    UnknownChat(ChatId),
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
