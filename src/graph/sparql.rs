//! Read-only RDF triple store backed by oxigraph.
//!
//! The store is loaded once from Turtle at process start and never mutated
//! afterwards, so concurrent reads need no locking.

use std::path::Path;

use oxigraph::io::RdfFormat;
use oxigraph::model::vocab::xsd;
use oxigraph::model::{Literal, Term};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use crate::error::{GraphError, StoreError};

use super::{Bindings, Value};

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// SPARQL-capable RDF store holding the frozen knowledge graph.
pub struct SparqlStore {
    store: Store,
}

impl SparqlStore {
    /// Create an empty in-memory store.
    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Store::new().map_err(|e| StoreError::Init {
            message: format!("failed to create oxigraph store: {e}"),
        })?;
        Ok(Self { store })
    }

    /// Load a Turtle file into a fresh in-memory store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let file = std::fs::File::open(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self::in_memory()?;
        store
            .store
            .load_from_reader(RdfFormat::Turtle, std::io::BufReader::new(file))
            .map_err(|e| StoreError::Load {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        tracing::info!(path = %path.display(), triples = store.len(), "loaded knowledge graph");
        Ok(store)
    }

    /// Parse Turtle text into a fresh in-memory store.
    pub fn from_turtle(turtle: &str) -> Result<Self, StoreError> {
        let store = Self::in_memory()?;
        store
            .store
            .load_from_reader(RdfFormat::Turtle, turtle.as_bytes())
            .map_err(|e| StoreError::Load {
                path: "<inline>".into(),
                message: e.to_string(),
            })?;
        Ok(store)
    }

    /// Execute a SPARQL SELECT query and return one binding map per solution.
    pub fn query_select(&self, sparql: &str) -> GraphResult<Vec<Bindings>> {
        let results = self.store.query(sparql).map_err(|e| GraphError::Sparql {
            message: format!("SPARQL query failed: {e}"),
        })?;

        match results {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| GraphError::Sparql {
                        message: format!("solution error: {e}"),
                    })?;
                    let row: Bindings = solution
                        .iter()
                        .map(|(var, term)| (var.as_str().to_string(), term_to_value(term)))
                        .collect();
                    rows.push(row);
                }
                Ok(rows)
            }
            QueryResults::Boolean(_) => Err(GraphError::UnexpectedResults {
                expected: "SELECT solutions, got ASK boolean".into(),
            }),
            QueryResults::Graph(_) => Err(GraphError::UnexpectedResults {
                expected: "SELECT solutions, got CONSTRUCT/DESCRIBE graph".into(),
            }),
        }
    }

    /// Number of triples in the store.
    pub fn len(&self) -> usize {
        self.store.len().unwrap_or(0)
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SparqlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparqlStore").finish()
    }
}

fn term_to_value(term: &Term) -> Value {
    match term {
        Term::NamedNode(n) => Value::Iri(n.as_str().to_string()),
        Term::BlankNode(b) => Value::Blank(b.as_str().to_string()),
        Term::Literal(lit) => literal_to_value(lit),
        #[allow(unreachable_patterns)]
        other => Value::Text(other.to_string()),
    }
}

fn literal_to_value(lit: &Literal) -> Value {
    let lexical = lit.value();
    let datatype = lit.datatype();
    let parsed = if datatype == xsd::INTEGER
        || datatype == xsd::INT
        || datatype == xsd::LONG
        || datatype == xsd::SHORT
    {
        lexical.parse().ok().map(Value::Integer)
    } else if datatype == xsd::DECIMAL || datatype == xsd::DOUBLE || datatype == xsd::FLOAT {
        lexical.parse().ok().map(Value::Float)
    } else if datatype == xsd::BOOLEAN {
        match lexical {
            "true" | "1" => Some(Value::Boolean(true)),
            "false" | "0" => Some(Value::Boolean(false)),
            _ => None,
        }
    } else {
        None
    };
    parsed.unwrap_or_else(|| Value::Text(lexical.to_string()))
}
