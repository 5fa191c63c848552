use thiserror::Error;

/// Unified error type for ledsign
#[derive(Error, Debug)]
pub enum SignError {
    #[error("Drawing surface error: {0}")]
    Surface(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Pattern error: {0}")]
    Pattern(String),

    #[error("Playlist error: {0}")]
    Playlist(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type SignResult<T> = Result<T, SignError>;
