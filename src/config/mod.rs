//! Search configuration.
//!
//! Thresholds and budgets for one search session, loadable from TOML.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::search::EnumerationStrategy;

/// Configuration of one extraction search session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Cognitive complexity a method (or an extracted method) may keep
    /// without being penalized.
    #[serde(default = "default_max_complexity")]
    pub max_complexity: u32,

    /// Upper bound on whole-method candidates evaluated per search.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: u64,

    /// Traversal order for the per-group partition iterators.
    #[serde(default = "default_strategy")]
    pub strategy: EnumerationStrategy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_complexity: default_max_complexity(),
            max_candidates: default_max_candidates(),
            strategy: default_strategy(),
        }
    }
}

impl SearchConfig {
    /// Parse a configuration from a TOML document. Missing fields fall back
    /// to their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SearchConfig =
            toml::from_str(content).map_err(|e| Error::Configuration(e.to_string()))?;
        log::debug!("loaded search config: {config:?}");
        Ok(config)
    }
}

fn default_max_complexity() -> u32 {
    15
}

fn default_max_candidates() -> u64 {
    100_000
}

fn default_strategy() -> EnumerationStrategy {
    EnumerationStrategy::LongSequenceFirst
}
