// SPDX-License-Identifier: MIT

//! Engine configuration
//!
//! Loaded from a YAML file or from `EL_*` environment variables:
//!
//! ```yaml
//! cache_capacity: 1000
//! concurrency: 16
//! features: [method_invocations, varargs]
//! ```

use crate::el::Feature;
use crate::error::ElError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for a [`TreeStore`](crate::el::TreeStore)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ElConfig {
    /// Maximum number of cached trees
    #[serde(default = "default_capacity")]
    pub cache_capacity: usize,
    /// Expected number of parallel callers; 0 or 1 selects the
    /// single-segment cache
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Enabled parser features
    #[serde(default)]
    pub features: Vec<Feature>,
}

fn default_capacity() -> usize {
    ElConfig::DEFAULT_CAPACITY
}

fn default_concurrency() -> usize {
    ElConfig::DEFAULT_CONCURRENCY
}

impl Default for ElConfig {
    fn default() -> Self {
        Self {
            cache_capacity: Self::DEFAULT_CAPACITY,
            concurrency: Self::DEFAULT_CONCURRENCY,
            features: Vec::new(),
        }
    }
}

impl ElConfig {
    pub const DEFAULT_CAPACITY: usize = 1000;
    pub const DEFAULT_CONCURRENCY: usize = 16;

    /// Parse a configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ElError> {
        let config: ElConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ElError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Defaults overridden by `EL_CACHE_CAPACITY`, `EL_CACHE_CONCURRENCY`
    /// and `EL_FEATURES` (comma separated)
    pub fn from_env() -> Result<Self, ElError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ElError> {
        let mut config = Self::default();
        if let Some(value) = lookup("EL_CACHE_CAPACITY") {
            config.cache_capacity = parse_number("EL_CACHE_CAPACITY", &value)?;
        }
        if let Some(value) = lookup("EL_CACHE_CONCURRENCY") {
            config.concurrency = parse_number("EL_CACHE_CONCURRENCY", &value)?;
        }
        if let Some(value) = lookup("EL_FEATURES") {
            config.features = value
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse)
                .collect::<Result<_, _>>()?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ElError> {
        if self.cache_capacity == 0 {
            return Err(ElError::config("cache_capacity must be positive"));
        }
        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize, ElError> {
    value
        .trim()
        .parse()
        .map_err(|_| ElError::config(format!("{} must be a number, got '{}'", key, value)))
}
