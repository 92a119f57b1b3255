// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # ayurgraph
//!
//! Knowledge-graph retrieval and context assembly for an Ayurvedic
//! question-answering assistant.
//!
//! ## Architecture
//!
//! - **Store** (`graph::sparql`): Turtle file loaded once into an in-memory oxigraph store
//! - **Query cache** (`graph::query_cache`): bounded LRU memoization of SELECT results via `moka`
//! - **Retrieval** (`retrieve`): entity cache, fuzzy matching, detail resolution, relationship expansion
//! - **Visualization** (`visualize`): node/edge graphs for a search or the whole store
//! - **Search** (`search`, `context`): the aggregate search result and its grounding text
//! - **Chat** (`chat`, `llm`): grounded answers from an OpenAI-compatible chat service
//!
//! ## Library usage
//!
//! ```no_run
//! use ayurgraph::config::Config;
//! use ayurgraph::engine::Engine;
//!
//! let engine = Engine::new(&Config::default()).unwrap();
//! let result = engine.search("tulsi");
//! for entity in &result.entities {
//!     println!("{} ({:.2})", entity.entity.label, entity.entity.confidence);
//! }
//! println!("{}", engine.grounding_context("tulsi"));
//! ```

pub mod chat;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod graph;
pub mod llm;
pub mod retrieve;
pub mod search;
pub mod visualize;
