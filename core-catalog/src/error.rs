//! # Catalog Error Types

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors raised while building the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Listing or reading the object store failed.
    #[error("Object store error: {0}")]
    ObjectStore(#[from] BridgeError),

    /// Catalog configuration failed validation.
    #[error("Invalid catalog configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
