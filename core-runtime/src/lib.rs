//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the offline catalog core:
//! - Logging and tracing infrastructure
//! - Configuration management and bridge wiring
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other `core-*` crates depend
//! on. It establishes the logging conventions (including how signed URLs are
//! kept out of log output) and the fail-fast configuration builder that
//! decides which host bridges are injected and which desktop defaults apply.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
