//! Startup snapshot of every labeled entity, grouped by category.

use serde::Serialize;

use crate::graph::query_cache::QueryExecutor;
use crate::graph::{EntityCategory, PREFIXES, Value};

/// One cached entity: its display label and identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityEntry {
    pub label: String,
    pub uri: String,
}

/// Immutable per-category entity lists.
///
/// Built once from the store and never refreshed; the order within a category
/// follows store iteration order.
#[derive(Debug, Clone, Default)]
pub struct EntityCache {
    entries: [Vec<EntityEntry>; 8],
}

impl EntityCache {
    /// Query the store once per category.
    ///
    /// A failing category query leaves that category empty; the others still populate.
    pub fn build(executor: &QueryExecutor) -> Self {
        Self::build_with(executor, category_query)
    }

    fn build_with(executor: &QueryExecutor, query_for: impl Fn(EntityCategory) -> String) -> Self {
        let mut cache = Self::default();
        for category in EntityCategory::ALL {
            let rows = executor.select(&query_for(category));
            let entries: Vec<EntityEntry> = rows
                .iter()
                .filter_map(|row| {
                    let uri = match row.get("entity")? {
                        Value::Iri(uri) => uri.clone(),
                        _ => return None,
                    };
                    let label = row
                        .get("label")
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "Unknown".into());
                    Some(EntityEntry { label, uri })
                })
                .collect();
            tracing::debug!(category = %category, entities = entries.len(), "entity cache populated");
            cache.entries[category.index()] = entries;
        }
        cache
    }

    /// Entities of one category.
    pub fn entries(&self, category: EntityCategory) -> &[EntityEntry] {
        &self.entries[category.index()]
    }

    /// Every `(category, entry)` pair, in category order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityCategory, &EntityEntry)> {
        EntityCategory::ALL
            .into_iter()
            .flat_map(move |c| self.entries(c).iter().map(move |e| (c, e)))
    }

    /// Total number of cached entities.
    pub fn len(&self) -> usize {
        self.entries.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn category_query(category: EntityCategory) -> String {
    format!(
        "{PREFIXES}SELECT ?entity ?label WHERE {{ ?entity a ayur:{} ; rdfs:label ?label }}",
        category.class_name()
    )
}
