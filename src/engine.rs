//! Engine facade: the one context object every request is served from.
//!
//! The `Engine` is built once at process start. It owns the loaded store
//! (behind the memoizing executor), the entity cache and the pipeline limits.
//! After construction only the query cache is ever mutated, so a single
//! instance can be shared by reference across request threads.

use std::path::Path;

use serde::Serialize;

use crate::config::{Config, EngineConfig};
use crate::context::format_context;
use crate::error::AyurResult;
use crate::graph::EntityCategory;
use crate::graph::query_cache::QueryExecutor;
use crate::graph::sparql::SparqlStore;
use crate::retrieve::details::{EntityDetails, resolve_entity_details};
use crate::retrieve::entity_cache::EntityCache;
use crate::retrieve::matcher::{EntityMatch, find_similar_entities};
use crate::search::{SearchOptions, SearchResult, run_comprehensive_search};
use crate::visualize::{VisualizationGraph, build_full};

/// The knowledge-graph retrieval engine.
pub struct Engine {
    executor: QueryExecutor,
    entities: EntityCache,
    options: SearchOptions,
}

impl Engine {
    /// Load the configured Turtle file and build the entity cache.
    pub fn new(config: &Config) -> AyurResult<Self> {
        Self::load(&config.data_path, &config.engine)
    }

    /// Load a Turtle file with explicit engine limits.
    pub fn load(path: &Path, config: &EngineConfig) -> AyurResult<Self> {
        let store = SparqlStore::load(path)?;
        Ok(Self::from_store(store, config))
    }

    /// Build an engine over an already loaded store.
    pub fn from_store(store: SparqlStore, config: &EngineConfig) -> Self {
        let executor = QueryExecutor::new(store, config.query_cache_capacity);
        let entities = EntityCache::build(&executor);
        Self {
            executor,
            entities,
            options: config.search_options(),
        }
    }

    /// Match, resolve, expand and visualize one query.
    pub fn search(&self, query: &str) -> SearchResult {
        run_comprehensive_search(&self.executor, &self.entities, &self.options, query)
    }

    /// Visualize every triple whose endpoints both have a declared type.
    pub fn full_graph(&self) -> VisualizationGraph {
        build_full(&self.executor)
    }

    /// Fuzzy-match cached entity labels, optionally within one category.
    pub fn find_similar_entities(
        &self,
        text: &str,
        category: Option<EntityCategory>,
    ) -> Vec<EntityMatch> {
        find_similar_entities(&self.entities, text, category, &self.options.matching)
    }

    /// All outgoing properties of one entity.
    pub fn entity_details(&self, uri: &str) -> EntityDetails {
        resolve_entity_details(&self.executor, uri)
    }

    /// Grounding text for a query; empty when nothing in the graph matches.
    pub fn grounding_context(&self, query: &str) -> String {
        format_context(&self.search(query))
    }

    pub fn entity_cache(&self) -> &EntityCache {
        &self.entities
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Store and cache statistics.
    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            triple_count: self.executor.store().len(),
            entity_count: self.entities.len(),
            categories: EntityCategory::ALL
                .iter()
                .map(|&c| (c, self.entities.entries(c).len()))
                .collect(),
            store_executions: self.executor.executions(),
            cached_queries: self.executor.cached_queries(),
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("entities", &self.entities.len())
            .field("executor", &self.executor)
            .finish()
    }
}

/// Summary statistics about a running engine.
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub triple_count: usize,
    pub entity_count: usize,
    /// Cached entities per category, in category order.
    pub categories: Vec<(EntityCategory, usize)>,
    pub store_executions: u64,
    pub cached_queries: u64,
}

impl std::fmt::Display for EngineInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ayurgraph engine info")?;
        writeln!(f, "  triples:      {}", self.triple_count)?;
        writeln!(f, "  entities:     {}", self.entity_count)?;
        for (category, count) in &self.categories {
            writeln!(f, "    {:<12}{count}", format!("{category}:"))?;
        }
        writeln!(f, "  executions:   {}", self.store_executions)?;
        writeln!(f, "  cached:       {}", self.cached_queries)?;
        Ok(())
    }
}
