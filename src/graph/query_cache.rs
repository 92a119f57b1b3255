//! Memoizing executor for pattern queries.
//!
//! All store access made while answering a query goes through
//! [`QueryExecutor::select`]. Results are memoized by exact query text in a
//! bounded LRU cache. Two callers missing the same key at once may both run
//! the query; the last insert wins and both see identical rows.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use oxigraph::model::NamedNode;

use crate::error::EncodingError;

use super::sparql::SparqlStore;
use super::{Bindings, RDF_TYPE, RDFS_LABEL, Triple, Value};

/// Default number of memoized query texts.
pub const DEFAULT_CAPACITY: u64 = 1000;

/// Characters `escape_iri` leaves untouched besides ASCII alphanumerics.
const IRI_SAFE: &str = ":/?#[]@!$&()*+,;=-._~";

const ALL_TRIPLES_QUERY: &str = "SELECT ?s ?p ?o WHERE { ?s ?p ?o }";

/// Executes SELECT queries against the store, memoizing rows per query text.
pub struct QueryExecutor {
    store: SparqlStore,
    cache: Cache<String, Arc<Vec<Bindings>>>,
    executions: AtomicU64,
}

impl QueryExecutor {
    /// Wrap a loaded store with a cache holding at most `capacity` query texts.
    pub fn new(store: SparqlStore, capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self {
            store,
            cache,
            executions: AtomicU64::new(0),
        }
    }

    /// Run a SELECT query, returning cached rows when this exact text was seen.
    ///
    /// Store failures are logged with the query text and yield no rows.
    pub fn select(&self, sparql: &str) -> Arc<Vec<Bindings>> {
        if let Some(rows) = self.cache.get(sparql) {
            return rows;
        }

        self.executions.fetch_add(1, Ordering::Relaxed);
        let rows = match self.store.query_select(sparql) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = %e, query = sparql, "SPARQL error");
                Vec::new()
            }
        };
        let rows = Arc::new(rows);
        self.cache.insert(sparql.to_string(), Arc::clone(&rows));
        rows
    }

    /// `rdfs:label` of an IRI, if present.
    pub fn label_of(&self, iri: &str) -> Option<String> {
        let node = escape_iri(iri).ok()?;
        let rows = self.select(&format!(
            "SELECT ?label WHERE {{ {node} <{RDFS_LABEL}> ?label }}"
        ));
        rows.first()
            .and_then(|row| row.get("label"))
            .map(|v| v.to_string())
    }

    /// Declared `rdf:type` IRIs of an IRI, in store order.
    pub fn types_of(&self, iri: &str) -> Vec<String> {
        let Ok(node) = escape_iri(iri) else {
            return Vec::new();
        };
        let rows = self.select(&format!("SELECT ?type WHERE {{ {node} <{RDF_TYPE}> ?type }}"));
        rows.iter()
            .filter_map(|row| match row.get("type")? {
                Value::Iri(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every triple in the store, in store iteration order.
    pub fn all_triples(&self) -> Vec<Triple> {
        self.select(ALL_TRIPLES_QUERY)
            .iter()
            .filter_map(|row| {
                let predicate = match row.get("p")? {
                    Value::Iri(p) => p.clone(),
                    _ => return None,
                };
                Some(Triple {
                    subject: row.get("s")?.clone(),
                    predicate,
                    object: row.get("o")?.clone(),
                })
            })
            .collect()
    }

    /// Number of queries that actually reached the store.
    pub fn executions(&self) -> u64 {
        self.executions.load(Ordering::Relaxed)
    }

    /// Approximate number of memoized query texts.
    pub fn cached_queries(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    /// The underlying store.
    pub fn store(&self) -> &SparqlStore {
        &self.store
    }
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("executions", &self.executions())
            .field("cached", &self.cache.entry_count())
            .finish()
    }
}

/// Percent-encode an identifier and wrap it as a SPARQL IRI reference.
///
/// Reserved IRI delimiters pass through; spaces, quotes, angle brackets and
/// non-ASCII bytes are escaped. The result must still parse as an absolute IRI.
pub fn escape_iri(identifier: &str) -> Result<String, EncodingError> {
    let mut escaped = String::with_capacity(identifier.len());
    for byte in identifier.bytes() {
        if byte.is_ascii_alphanumeric() || IRI_SAFE.as_bytes().contains(&byte) {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("%{byte:02X}"));
        }
    }
    NamedNode::new(escaped.as_str()).map_err(|e| EncodingError::InvalidIri {
        identifier: identifier.to_string(),
        message: e.to_string(),
    })?;
    Ok(format!("<{escaped}>"))
}
