//! # Cache Configuration

use crate::error::{CacheError, Result};
use std::time::Duration;

/// Settings for the asset cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a record stays valid after it is written.
    ///
    /// Default: 7 days.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// TTL as a chrono duration for timestamp arithmetic.
    pub(crate) fn ttl_chrono(&self) -> Result<chrono::Duration> {
        chrono::Duration::from_std(self.ttl)
            .map_err(|e| CacheError::InvalidConfig(format!("ttl out of range: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "ttl must be greater than zero".to_string(),
            ));
        }
        self.ttl_chrono()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_a_week() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl.as_secs(), 604_800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = CacheConfig::default().with_ttl(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }
}
