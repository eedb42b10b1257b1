use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Source and destination are the same directory: {}", .0.display())]
    SameDirectory(PathBuf),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl MergeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MergeError::Io { path: path.into(), source }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        MergeError::Parse { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;
