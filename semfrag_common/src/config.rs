//! Configuration for fragment enumeration and matching.
//!
//! Quick examples
//!
//! Defaults (parallel, collect every match, no search budget):
//! ```
//! use semfrag_common::Config;
//! let cfg = Config::default();
//! assert!(cfg.parallel);
//! ```
//!
//! First match per sentence, bounded search:
//! ```
//! use semfrag_common::{Config, MatchMode};
//! let cfg = Config::builder()
//!     .match_mode(MatchMode::First)
//!     .node_budget(Some(100_000))
//!     .build();
//! assert_eq!(cfg.node_budget, Some(100_000));
//! ```

use serde::{Deserialize, Serialize};

/// Default ceiling on sentence size for fragment enumeration.
///
/// Enumeration visits 2^|E| edge subsets, so this bounds the work per
/// sentence at roughly sixteen million leaves.
pub const DEFAULT_ENUMERATION_EDGE_LIMIT: usize = 24;

/// Global search configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spread candidate sentences (queries) and sentences (statistics)
    /// over the rayon pool.
    pub parallel: bool,
    /// Whether to keep every matching selection of a sentence.
    pub match_mode: MatchMode,
    /// Maximum number of search steps per fragment query.
    pub node_budget: Option<u64>,
    /// Sentences with more edges are skipped by feature statistics.
    pub enumeration_edge_limit: Option<usize>,
}

impl Config {
    /// Start a builder seeded with the defaults.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse a configuration from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parallel: true,
            match_mode: MatchMode::All,
            node_budget: None,
            enumeration_edge_limit: Some(DEFAULT_ENUMERATION_EDGE_LIMIT),
        }
    }
}

/// Controls how many matching selections are collected per sentence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Keep every position selection that is an exact image of the fragment.
    #[default]
    All,
    /// Stop at the first matching selection of each sentence.
    First,
}

/// Builder for [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Enable or disable rayon parallelism.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Set the per-sentence match collection mode.
    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.config.match_mode = mode;
        self
    }

    /// Bound the number of search steps per fragment query.
    pub fn node_budget(mut self, budget: Option<u64>) -> Self {
        self.config.node_budget = budget;
        self
    }

    /// Bound the sentence size accepted by fragment enumeration.
    pub fn enumeration_edge_limit(mut self, limit: Option<usize>) -> Self {
        self.config.enumeration_edge_limit = limit;
        self
    }

    /// Finish building.
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let cfg = Config::from_json(r#"{"match_mode": "first", "node_budget": 10}"#).unwrap();
        assert_eq!(cfg.match_mode, MatchMode::First);
        assert_eq!(cfg.node_budget, Some(10));
        assert!(cfg.parallel);
        assert_eq!(cfg.enumeration_edge_limit, Some(DEFAULT_ENUMERATION_EDGE_LIMIT));
    }

    #[test]
    fn builder_overrides_defaults() {
        let cfg = Config::builder()
            .parallel(false)
            .enumeration_edge_limit(None)
            .build();
        assert!(!cfg.parallel);
        assert_eq!(cfg.enumeration_edge_limit, None);
        assert_eq!(cfg.match_mode, MatchMode::All);
    }
}
