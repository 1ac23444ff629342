use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

/// Failure while accessing the payload of a [`crate::DataHandle`].
///
/// All variants belong to the same I/O category: callers decide whether to
/// retry or propagate, nothing is retried internally.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("file too large, size= {size} (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },
    #[error("unsupported content for {0}")]
    Unsupported(&'static str),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        Self::Other(anyhow::anyhow!(e.to_string()))
    }
}

impl From<DataError> for io::Error {
    fn from(e: DataError) -> Self {
        match e {
            DataError::Io(inner) => inner,
            DataError::FileTooLarge { .. } | DataError::Encoding(_) => {
                io::Error::new(io::ErrorKind::InvalidData, e)
            }
            DataError::Unsupported(_) => {
                io::Error::new(io::ErrorKind::Unsupported, e)
            }
            DataError::Other(_) => io::Error::new(io::ErrorKind::Other, e),
        }
    }
}
