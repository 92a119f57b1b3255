//! Rich diagnostic error types for the ayurgraph engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains. Only store loading and
//! configuration errors are ever fatal; everything raised while answering a
//! query is caught by the smallest enclosing component and degraded.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the fatal start-up paths of the engine.
///
/// Query-time errors (`GraphError`, `EncodingError`, `SearchError`,
/// `LlmError`) never reach this type; they are logged and degraded where
/// they occur.
#[derive(Debug, Error, Diagnostic)]
pub enum AyurError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("failed to read knowledge graph file: {path}")]
    #[diagnostic(
        code(ayur::store::io),
        help(
            "The Turtle file could not be opened. Check the `--data` path \
             or `data_path` in the config file."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse knowledge graph {path}: {message}")]
    #[diagnostic(
        code(ayur::store::load),
        help("The file must be valid Turtle. Regenerate it with the graph authoring tool.")
    )]
    Load { path: String, message: String },

    #[error("failed to create triple store: {message}")]
    #[diagnostic(
        code(ayur::store::init),
        help("The in-memory oxigraph store could not be created.")
    )]
    Init { message: String },
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("SPARQL query error: {message}")]
    #[diagnostic(
        code(ayur::graph::sparql),
        help(
            "The SPARQL query failed. Check the query syntax and that both \
             the `ayur:` and `rdfs:` prefixes are declared."
        )
    )]
    Sparql { message: String },

    #[error("unexpected query result form: expected {expected}")]
    #[diagnostic(
        code(ayur::graph::unexpected_results),
        help("Only SELECT queries produce variable bindings.")
    )]
    UnexpectedResults { expected: String },
}

// ---------------------------------------------------------------------------
// Encoding errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EncodingError {
    #[error("identifier cannot be embedded in a query: {identifier}")]
    #[diagnostic(
        code(ayur::encoding::invalid_iri),
        help("After escaping, the identifier is still not a valid IRI: {message}")
    )]
    InvalidIri { identifier: String, message: String },
}

// ---------------------------------------------------------------------------
// Search errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SearchError {
    #[error("search aggregation failed: {message}")]
    #[diagnostic(
        code(ayur::search::aggregation),
        help("A step of the comprehensive search failed; the response was degraded to empty results.")
    )]
    Aggregation { message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(ayur::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(ayur::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },
}

/// Convenience alias for functions returning ayurgraph results.
pub type AyurResult<T> = std::result::Result<T, AyurError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_converts_to_ayur_error() {
        let err = StoreError::Init {
            message: "no backend".into(),
        };
        let ayur: AyurError = err.into();
        assert!(matches!(ayur, AyurError::Store(StoreError::Init { .. })));
    }

    #[test]
    fn config_error_converts_to_ayur_error() {
        let err = ConfigError::Parse {
            path: "ayurgraph.toml".into(),
            message: "expected `=`".into(),
        };
        let ayur: AyurError = err.into();
        assert!(matches!(ayur, AyurError::Config(ConfigError::Parse { .. })));
        assert!(format!("{ayur}").contains("ayurgraph.toml"));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = StoreError::Load {
            path: "data/kg.ttl".into(),
            message: "unexpected token".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("data/kg.ttl"));
        assert!(msg.contains("unexpected token"));
    }
}
