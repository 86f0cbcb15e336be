use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelogError {
    #[error("Insufficient tag history: at least two tags matching the release format are required")]
    InsufficientTagHistory,

    #[error("No release window: tag '{0}' has no older neighbour in the tag history")]
    NoReleaseWindow(String),

    #[error("Git command failed: {0}")]
    Git(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("API request failed (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RelogError>;
