use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Zip(zip::result::ZipError),
    Io(std::io::Error),
    InvalidData(String),
    OutputExists(PathBuf),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "SQLite error: {e}"),
            StoreError::Zip(e) => write!(f, "archive error: {e}"),
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            StoreError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            StoreError::OutputExists(path) => {
                write!(f, "{} already exists and overwriting is disabled", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e)
    }
}

impl From<zip::result::ZipError> for StoreError {
    fn from(e: zip::result::ZipError) -> Self {
        StoreError::Zip(e)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
