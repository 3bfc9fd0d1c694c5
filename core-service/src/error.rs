use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] core_catalog::CatalogError),

    #[error("Cache error: {0}")]
    Cache(#[from] core_cache::CacheError),

    /// The issuer could not sign `key`.
    #[error("Failed to resolve a URL for {key}: {source}")]
    Resolution {
        key: String,
        #[source]
        source: BridgeError,
    },
}

pub type Result<T> = std::result::Result<T, ServiceError>;
