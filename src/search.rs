//! Comprehensive search: match, resolve, expand, visualize.
//!
//! Store and encoding failures are recovered inside each stage. Anything
//! that still escapes a stage degrades the whole response to empty
//! collections plus an `error` description; it never reaches the caller as an
//! `Err` or a panic.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

use crate::error::SearchError;
use crate::graph::query_cache::QueryExecutor;
use crate::retrieve::details::{EntityDetails, resolve_entity_details};
use crate::retrieve::entity_cache::EntityCache;
use crate::retrieve::expand::{Relationships, expand_relationships};
use crate::retrieve::matcher::{EntityMatch, MatchOptions, find_similar_entities};
use crate::visualize::{VisualizationGraph, build_scoped};

/// Pipeline limits.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub matching: MatchOptions,
    /// Matches whose details are resolved and drawn.
    pub detail_limit: usize,
    /// Matches whose relationships are expanded.
    pub expansion_limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            matching: MatchOptions::default(),
            detail_limit: 10,
            expansion_limit: 5,
        }
    }
}

/// A matched entity together with its resolved details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedEntity {
    #[serde(flatten)]
    pub entity: EntityMatch,
    pub details: EntityDetails,
}

/// Aggregate result of one comprehensive search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub entities: Vec<DetailedEntity>,
    pub relationships: Relationships,
    pub visualization: VisualizationGraph,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResult {
    /// The all-empty response carrying an error description.
    pub fn degraded(query: &str, error: impl Into<String>) -> Self {
        Self {
            entities: Vec::new(),
            relationships: Relationships::default(),
            visualization: VisualizationGraph::default(),
            query: query.to_string(),
            error: Some(error.into()),
        }
    }

    /// Whether the search failed and was degraded.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Run the full retrieval pipeline for one query.
pub fn run_comprehensive_search(
    executor: &QueryExecutor,
    cache: &EntityCache,
    options: &SearchOptions,
    query: &str,
) -> SearchResult {
    guarded(query, || search(executor, cache, options, query))
}

/// Run one pipeline pass, degrading a panic in any stage to an error result.
///
/// Every stage recovers its own store and encoding failures, so only a
/// violated invariant can get here.
fn guarded(query: &str, pipeline: impl FnOnce() -> SearchResult) -> SearchResult {
    match panic::catch_unwind(AssertUnwindSafe(pipeline)) {
        Ok(result) => result,
        Err(payload) => {
            let e = SearchError::Aggregation {
                message: panic_message(payload.as_ref()),
            };
            tracing::error!(error = %e, query, "comprehensive search failed");
            SearchResult::degraded(query, e.to_string())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}

fn search(
    executor: &QueryExecutor,
    cache: &EntityCache,
    options: &SearchOptions,
    query: &str,
) -> SearchResult {
    let matches = find_similar_entities(cache, query, None, &options.matching);

    let entities = matches
        .iter()
        .take(options.detail_limit)
        .map(|entity| DetailedEntity {
            entity: entity.clone(),
            details: resolve_entity_details(executor, &entity.uri),
        })
        .collect();

    let relationships = expand_relationships(executor, query, &matches, options.expansion_limit);

    let visualization = build_scoped(executor, &matches, &relationships, options.detail_limit);

    tracing::debug!(
        query,
        matches = matches.len(),
        bundles = relationships.len(),
        nodes = visualization.nodes.len(),
        "comprehensive search complete"
    );

    SearchResult {
        entities,
        relationships,
        visualization,
        query: query.to_string(),
        error: None,
    }
}
