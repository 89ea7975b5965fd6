use crate::core::{directory::DirectoryError, workflow::WorkflowError};
use teloxide::{DownloadError, RequestError};
use thiserror::Error;
use url::ParseError;

#[derive(Error, Debug)]
pub enum MyError {
    #[error("Teloxide API Error: {0}")]
    Teloxide(#[from] RequestError),

    #[error("Reqwest Error: {0}")]
    Reqwest(reqwest::Error),

    #[error("Failed to parse URL: {0}")]
    UrlParse(#[from] ParseError),

    #[error("Serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcription service error: {0}")]
    Transcription(String),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Application Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for MyError {
    /// File URLs embed the bot token, so the URL is dropped before the error
    /// can reach a log line.
    fn from(err: reqwest::Error) -> Self {
        MyError::Reqwest(err.without_url())
    }
}

impl From<DownloadError> for MyError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Network(e) => e.into(),
            other => MyError::Other(other.to_string()),
        }
    }
}
