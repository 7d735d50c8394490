// SPDX-License-Identifier: MIT

//! Tree builders and the caching tree store
//!
//! `TreeStore` is what a workflow engine holds on to: it hands out shared,
//! compiled trees and only parses on a cache miss.

use super::cache::{BoundedCache, ConcurrentCache, TreeCache};
use super::parser::{Feature, Parser, ParserConfig};
use super::tree::Tree;
use crate::config::ElConfig;
use crate::error::ElError;
use std::sync::Arc;

/// Compiles expression strings into trees
pub trait TreeBuilder: Send + Sync {
    fn build(&self, expression: &str) -> Result<Tree, ElError>;
}

/// Default builder: scanner + parser with a fixed feature set
#[derive(Debug, Clone, Default)]
pub struct Builder {
    config: ParserConfig,
}

impl Builder {
    pub fn new(features: impl IntoIterator<Item = Feature>) -> Self {
        Self {
            config: ParserConfig::new(features),
        }
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.config.is_enabled(feature)
    }
}

impl TreeBuilder for Builder {
    fn build(&self, expression: &str) -> Result<Tree, ElError> {
        Parser::parse(&self.config, expression).map_err(|e| {
            log::debug!("Failed to parse expression '{}': {}", expression, e);
            e
        })
    }
}

/// Parse `expression` with the default feature set, bypassing any cache
pub fn parse(expression: &str) -> Result<Tree, ElError> {
    Builder::default().build(expression)
}

/// Builder plus cache
pub struct TreeStore {
    builder: Box<dyn TreeBuilder>,
    cache: Box<dyn TreeCache>,
}

impl TreeStore {
    pub fn new(builder: Box<dyn TreeBuilder>, cache: Box<dyn TreeCache>) -> Self {
        Self { builder, cache }
    }

    /// Store with the default builder and cache layout of `config`.
    /// A concurrency of 0 or 1 selects the single-segment cache.
    pub fn from_config(config: &ElConfig) -> Result<Self, ElError> {
        config.validate()?;
        let builder = Builder::new(config.features.iter().copied());
        let cache: Box<dyn TreeCache> = if config.concurrency <= 1 {
            Box::new(BoundedCache::new(config.cache_capacity)?)
        } else {
            Box::new(ConcurrentCache::new(
                config.cache_capacity,
                config.concurrency,
            )?)
        };
        Ok(Self::new(Box::new(builder), cache))
    }

    /// Return the cached tree for `expression`, compiling and caching it on
    /// a miss. Two threads missing on the same key may both compile; the
    /// later insert wins.
    pub fn parse_or_get_cached(&self, expression: &str) -> Result<Arc<Tree>, ElError> {
        if let Some(tree) = self.cache.get(expression) {
            log::debug!("Cache hit for '{}'", expression);
            return Ok(tree);
        }
        log::debug!("Cache miss for '{}'", expression);
        let tree = Arc::new(self.builder.build(expression)?);
        self.cache.put(expression, tree.clone());
        Ok(tree)
    }

    pub fn cache(&self) -> &dyn TreeCache {
        self.cache.as_ref()
    }
}
