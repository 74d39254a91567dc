use thiserror::Error;

#[derive(Debug, Error)]
pub enum TleError {
    #[error("malformed TLE record: {0}")]
    MalformedRecord(String),
    #[error("TLE directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE format in {file}: {message}")]
    InvalidFile { file: String, message: String },
    #[error("No satellites loaded")]
    NoSatellites,
}

impl TleError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        TleError::MalformedRecord(message.into())
    }
}
