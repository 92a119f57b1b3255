//! Engine and answer-service configuration.
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! file (or no file at all) is a valid configuration. The answer-service API
//! key is never read from the file, see [`crate::llm::API_KEY_ENV`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::graph::query_cache::DEFAULT_CAPACITY;
use crate::llm::LlmConfig;
use crate::retrieve::matcher::MatchOptions;
use crate::search::SearchOptions;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Turtle file holding the knowledge graph.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/ayurgraph.ttl")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            engine: EngineConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Retrieval engine limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of distinct query texts kept in the result cache.
    #[serde(default = "default_query_cache_capacity")]
    pub query_cache_capacity: u64,
    /// Fuzzy matches must score strictly above this.
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,
    /// Matches whose details are resolved and visualized.
    #[serde(default = "default_detail_limit")]
    pub detail_limit: usize,
    /// Matches whose relationships are expanded.
    #[serde(default = "default_expansion_limit")]
    pub expansion_limit: usize,
}

fn default_query_cache_capacity() -> u64 {
    DEFAULT_CAPACITY
}
fn default_match_threshold() -> f32 {
    0.6
}
fn default_max_matches() -> usize {
    10
}
fn default_detail_limit() -> usize {
    10
}
fn default_expansion_limit() -> usize {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            query_cache_capacity: default_query_cache_capacity(),
            match_threshold: default_match_threshold(),
            max_matches: default_max_matches(),
            detail_limit: default_detail_limit(),
            expansion_limit: default_expansion_limit(),
        }
    }
}

impl EngineConfig {
    /// Search pipeline limits derived from this configuration.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            matching: MatchOptions {
                threshold: self.match_threshold,
                limit: self.max_matches,
            },
            detail_limit: self.detail_limit,
            expansion_limit: self.expansion_limit,
        }
    }
}
