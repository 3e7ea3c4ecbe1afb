//! Engine configuration, loadable from TOML.

use common::StyleError;
use serde::{Deserialize, Serialize};

/// Tunables for a [`Stylesheet`](crate::Stylesheet). Missing keys take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Memoize resolutions between rule-set generations.
    pub cache_enabled: bool,
    /// Entries per cache table before it is cleared wholesale.
    pub max_cache_entries: usize,
    /// Deepest allowed chain of mixins referencing mixins.
    pub max_mixin_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            max_cache_entries: 4096,
            max_mixin_depth: 32,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, StyleError> {
        let config: EngineConfig =
            toml::from_str(input).map_err(|e| StyleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StyleError> {
        if self.max_cache_entries == 0 {
            return Err(StyleError::Config("max_cache_entries must be at least 1".into()));
        }
        if self.max_mixin_depth == 0 {
            return Err(StyleError::Config("max_mixin_depth must be at least 1".into()));
        }
        Ok(())
    }

    /// Same configuration with caching turned off.
    pub fn uncached() -> Self {
        Self {
            cache_enabled: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_document_overrides() {
        let cfg = EngineConfig::from_toml_str("cache_enabled = false\nmax_mixin_depth = 4\n").unwrap();
        assert!(!cfg.cache_enabled);
        assert_eq!(cfg.max_mixin_depth, 4);
        assert_eq!(cfg.max_cache_entries, 4096);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let err = EngineConfig::from_toml_str("max_mixin_depth = 0").unwrap_err();
        assert_eq!(
            err,
            StyleError::Config("max_mixin_depth must be at least 1".into())
        );
        assert!(EngineConfig::from_toml_str("max_cache_entries = 0").is_err());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = EngineConfig::from_toml_str("cache_enabled = maybe").unwrap_err();
        assert!(matches!(err, StyleError::Config(_)));
    }
}
