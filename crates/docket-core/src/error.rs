use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocketError {
    #[error("not initialized: run 'docket init'")]
    NotInitialized,

    #[error("parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot serialize front matter: {0}")]
    Write(String),

    #[error("path is outside the project root: {}", .0.display())]
    PathOutsideRoot(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl DocketError {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DocketError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for errors that mean the schema itself cannot be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DocketError::Config(_) | DocketError::NotInitialized)
    }
}

pub type Result<T> = std::result::Result<T, DocketError>;
