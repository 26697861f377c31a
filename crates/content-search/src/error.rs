use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Another operation is already running")]
    Busy,

    #[error("No index has been built yet")]
    NoIndex,

    #[error("Watch error: {0}")]
    Watch(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
