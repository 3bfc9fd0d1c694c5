//! # Catalog Module
//!
//! Builds the media catalog from the layout of the remote object store.
//!
//! ## Overview
//!
//! The catalog is not stored anywhere; it is derived on every scan from the
//! object keys themselves:
//!
//! ```text
//! albums/<folder>/<cover>.jpg|png|jpeg      album cover (first match)
//! albums/<folder>/<stem>.mp3|wav|m4a        songs, in listing order
//! latest/<Title-Words-YYYY-MM-DD>.jpg       latest release cover
//! latest/<anything>.mp3                     optional latest preview
//! upcoming/<Title-Words-YYYY-MM-DD>.jpg     upcoming release cover
//! upcoming/<anything>.txt                   optional "Release Date:"/"Title:" sidecar
//! ```
//!
//! Identity is derived from names, so ids stay stable across scans as long
//! as the folder and file names do.
//!
//! ## Components
//!
//! - [`CatalogSource`]: the read interface consumed by the service layer
//! - [`CatalogScanner`]: the object-store backed implementation
//! - [`naming`]: pure filename parsing (ids, titles, release dates, sidecars)

pub mod config;
pub mod error;
pub mod models;
pub mod naming;
pub mod scanner;

pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use models::{Album, CatalogSnapshot, Release, ReleaseSlot, Song};
pub use scanner::{CatalogScanner, CatalogSource};
