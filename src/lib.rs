//! Workspace facade crate.
//!
//! Host applications depend on `offline-catalog-workspace` and pick a feature
//! instead of wiring each crate individually:
//!
//! - `desktop-shims` (default): the full service with desktop bridge adapters.
//! - `cache-only`: just the asset cache and catalog scanner, for hosts that
//!   bring their own resolution logic.

#[cfg(feature = "desktop-shims")]
pub use core_service as service;

#[cfg(feature = "cache-only")]
pub use core_cache as cache;

#[cfg(feature = "cache-only")]
pub use core_catalog as catalog;
