use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Unexpected HTTP status: {0}")]
    HttpStatus(u16),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Signing failed for {key}: {message}")]
    Signing { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
