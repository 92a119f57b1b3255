//! Node/edge graphs for the front-end graph view.
//!
//! Two builders share one output shape:
//!
//! - [`build_scoped`]: the matched entities, their relation-property targets
//!   and the expanded relationship bundles
//! - [`build_full`]: every IRI-to-IRI triple whose endpoints both have a
//!   recognized entity type
//!
//! Node shape and color are presentational and come from [`node_style`].

use std::collections::HashSet;

use serde::Serialize;

use crate::graph::query_cache::QueryExecutor;
use crate::graph::{EntityCategory, RelationProperty, Value, humanize, local_name, prettify};
use crate::retrieve::details::resolve_entity_details;
use crate::retrieve::expand::{Direction, Relationships};
use crate::retrieve::matcher::EntityMatch;

/// Group name for nodes without a recognized category.
pub const UNKNOWN_GROUP: &str = "unknown";

/// A visualization node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisNode {
    pub id: String,
    pub label: String,
    pub group: String,
    pub shape: &'static str,
    pub color: &'static str,
}

/// A labeled, directed visualization edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisEdge {
    pub from: String,
    pub to: String,
    pub label: String,
}

/// Nodes deduplicated by identifier (first insert wins) plus edges in
/// insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VisualizationGraph {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
}

impl VisualizationGraph {
    pub fn node(&self, id: &str) -> Option<&VisNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Shape and color for a node category.
pub fn node_style(category: Option<EntityCategory>) -> (&'static str, &'static str) {
    match category {
        Some(EntityCategory::Herb) => ("dot", "#34d399"),
        Some(EntityCategory::Condition) => ("box", "#fb7185"),
        Some(EntityCategory::Symptom) => ("box", "#fbbf24"),
        Some(EntityCategory::Treatment) => ("ellipse", "#6366f1"),
        Some(EntityCategory::Dosha) => ("dot", "#22c55e"),
        Some(EntityCategory::Compound) => ("dot", "#3b82f6"),
        Some(EntityCategory::Preparation) => ("ellipse", "#4ade80"),
        Some(EntityCategory::Source) => ("ellipse", "#10b981"),
        None => ("ellipse", "#94a3b8"),
    }
}

/// Fixed edge label for a relationship item, chosen by the item's role.
fn bundle_edge_label(role: EntityCategory) -> &'static str {
    match role {
        EntityCategory::Herb => "Recommended For",
        EntityCategory::Condition => "Treated By",
        EntityCategory::Dosha => "Balances Dosha",
        EntityCategory::Symptom => "Has Symptom",
        _ => "Treats",
    }
}

#[derive(Default)]
struct GraphBuilder {
    graph: VisualizationGraph,
    seen: HashSet<String>,
}

impl GraphBuilder {
    fn node(&mut self, id: &str, label: &str, category: Option<EntityCategory>) {
        if id.is_empty() || !self.seen.insert(id.to_string()) {
            return;
        }
        let (shape, color) = node_style(category);
        self.graph.nodes.push(VisNode {
            id: id.to_string(),
            label: label.to_string(),
            group: category.map_or(UNKNOWN_GROUP, EntityCategory::group).to_string(),
            shape,
            color,
        });
    }

    fn edge(&mut self, from: &str, to: &str, label: impl Into<String>) {
        self.graph.edges.push(VisEdge {
            from: from.to_string(),
            to: to.to_string(),
            label: label.into(),
        });
    }

    fn finish(self) -> VisualizationGraph {
        self.graph
    }
}

/// Build the graph around a search result.
///
/// The first `limit` matches become nodes, linked to the targets of their
/// relation properties; then every bundle item is linked to its anchor.
pub fn build_scoped(
    executor: &QueryExecutor,
    matches: &[EntityMatch],
    relationships: &Relationships,
    limit: usize,
) -> VisualizationGraph {
    let mut builder = GraphBuilder::default();

    for entity in matches.iter().take(limit) {
        builder.node(&entity.uri, &entity.label, Some(entity.category));
        let details = resolve_entity_details(executor, &entity.uri);
        for property in RelationProperty::ALL {
            for target in details.relation(property) {
                let label = executor.label_of(target).unwrap_or_else(|| prettify(target));
                builder.node(target, &label, Some(property.range()));
                builder.edge(&entity.uri, target, property.display_label());
            }
        }
    }

    for bundle in relationships.iter() {
        let anchor = &bundle.anchor;
        for item in &bundle.items {
            builder.node(&anchor.uri, &anchor.label, Some(anchor.category));
            builder.node(&item.uri, &item.label, Some(item.role));
            let (from, to) = match bundle.rule.direction {
                Direction::Outgoing => (&anchor.uri, &item.uri),
                Direction::Incoming => (&item.uri, &anchor.uri),
            };
            builder.edge(from, to, bundle_edge_label(item.role));
        }
    }

    builder.finish()
}

/// Build the graph of the whole store.
///
/// Triples with a literal endpoint are not drawn, and neither are triples
/// whose subject or object has no declared `rdf:type`. Typed endpoints whose
/// type is not an entity category (the class nodes themselves) are drawn
/// with the unknown style.
pub fn build_full(executor: &QueryExecutor) -> VisualizationGraph {
    let mut builder = GraphBuilder::default();
    let mut skipped = 0usize;

    for triple in executor.all_triples() {
        let (Value::Iri(subject), Value::Iri(object)) = (&triple.subject, &triple.object) else {
            skipped += 1;
            continue;
        };
        let (Some(s_cat), Some(o_cat)) =
            (declared_category(executor, subject), declared_category(executor, object))
        else {
            skipped += 1;
            continue;
        };
        let s_label = executor.label_of(subject).unwrap_or_else(|| prettify(subject));
        let o_label = executor.label_of(object).unwrap_or_else(|| prettify(object));
        builder.node(subject, &s_label, s_cat);
        builder.node(object, &o_label, o_cat);
        builder.edge(subject, object, humanize(local_name(&triple.predicate)));
    }

    let graph = builder.finish();
    tracing::info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        skipped,
        "built full graph"
    );
    graph
}

/// `None` when `iri` has no declared type; otherwise the first declared
/// type that is an entity category, if any.
fn declared_category(executor: &QueryExecutor, iri: &str) -> Option<Option<EntityCategory>> {
    let types = executor.types_of(iri);
    if types.is_empty() {
        return None;
    }
    Some(types.iter().find_map(|t| EntityCategory::from_class_iri(t)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::query_cache::DEFAULT_CAPACITY;
    use crate::graph::sparql::SparqlStore;
    use crate::retrieve::expand::expand_relationships;

    const TURTLE: &str = r#"
        @prefix ayur: <http://example.org/ayurvedic/> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

        ayur:Herb a rdfs:Class .
        ayur:h_tulsi a ayur:Herb ; rdfs:label "Tulsi" ;
            ayur:description "Holy basil." ;
            ayur:recommendedFor ayur:c_common_cold ;
            ayur:balancesDosha ayur:d_kapha .
        ayur:c_common_cold a ayur:Condition ; rdfs:label "Common Cold" ;
            ayur:hasSymptom ayur:s_mystery .
        ayur:d_kapha a ayur:Dosha .
        ayur:s_mystery rdfs:label "Mystery" .
    "#;

    const NS: &str = "http://example.org/ayurvedic/";

    fn executor() -> QueryExecutor {
        QueryExecutor::new(SparqlStore::from_turtle(TURTLE).unwrap(), DEFAULT_CAPACITY)
    }

    fn tulsi() -> EntityMatch {
        EntityMatch {
            category: EntityCategory::Herb,
            label: "Tulsi".into(),
            uri: format!("{NS}h_tulsi"),
            confidence: 1.0,
        }
    }

    #[test]
    fn scoped_graph_links_match_to_property_targets() {
        let exec = executor();
        let graph = build_scoped(&exec, &[tulsi()], &Relationships::default(), 10);

        let cold = graph.node(&format!("{NS}c_common_cold")).unwrap();
        assert_eq!(cold.label, "Common Cold");
        assert_eq!(cold.group, "conditions");
        assert_eq!(cold.shape, "box");

        // Unlabeled target falls back to its prettified identifier.
        assert_eq!(graph.node(&format!("{NS}d_kapha")).unwrap().label, "D Kapha");

        assert!(graph.edges.iter().any(|e| e.from == format!("{NS}h_tulsi")
            && e.to == format!("{NS}c_common_cold")
            && e.label == "Recommended For"));
        assert!(graph.edges.iter().any(|e| e.label == "Balances Dosha"));
    }

    #[test]
    fn scoped_graph_draws_bundle_edges_from_anchor() {
        let exec = executor();
        let matches = [tulsi()];
        let rels = expand_relationships(&exec, "tulsi", &matches, 5);
        let graph = build_scoped(&exec, &matches, &rels, 10);
        assert!(graph.edges.iter().any(|e| e.from == format!("{NS}h_tulsi")
            && e.to == format!("{NS}c_common_cold")
            && e.label == "Treated By"));
    }

    #[test]
    fn nodes_are_deduplicated_by_identifier() {
        let exec = executor();
        let graph = build_scoped(&exec, &[tulsi(), tulsi()], &Relationships::default(), 10);
        let mut ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn empty_input_gives_empty_graph() {
        let graph = build_scoped(&executor(), &[], &Relationships::default(), 10);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn full_graph_skips_literals_and_untyped_endpoints() {
        let graph = build_full(&executor());

        // tulsi->cold, tulsi->kapha and tulsi->Herb (rdf:type) connect typed
        // endpoints. cold->mystery has an untyped object, and the other type
        // edges point at classes never declared in this fixture.
        assert_eq!(graph.edges.len(), 3);
        assert!(graph.edges.iter().any(|e| e.label == "Recommended For"));
        assert!(graph.edges.iter().any(|e| e.to == format!("{NS}Herb") && e.label == "Type"));
        assert!(graph.node(&format!("{NS}s_mystery")).is_none());
        assert!(graph.node(&format!("{NS}Condition")).is_none());
        assert!(graph.nodes.iter().all(|n| !n.label.contains("Holy basil")));
        assert_eq!(graph.nodes.len(), 4);
    }

    #[test]
    fn class_nodes_use_unknown_style() {
        let graph = build_full(&executor());
        let herb_class = graph.node(&format!("{NS}Herb")).unwrap();
        assert_eq!(herb_class.group, UNKNOWN_GROUP);
        assert_eq!((herb_class.shape, herb_class.color), node_style(None));
        assert_eq!(herb_class.label, "Herb");
        assert_eq!(graph.node(&format!("{NS}h_tulsi")).unwrap().group, "herbs");
    }

    #[test]
    fn incoming_bundle_edges_point_at_anchor() {
        let exec = executor();
        let cold = EntityMatch {
            category: EntityCategory::Condition,
            label: "Common Cold".into(),
            uri: format!("{NS}c_common_cold"),
            confidence: 1.0,
        };
        let matches = [cold];
        let rels = expand_relationships(&exec, "cold", &matches, 5);
        assert!(rels.get("Common Cold_herbs").is_some());

        let graph = build_scoped(&exec, &matches, &rels, 10);
        assert!(graph.edges.iter().any(|e| e.from == format!("{NS}h_tulsi")
            && e.to == format!("{NS}c_common_cold")
            && e.label == "Recommended For"));
        assert!(!graph.edges.iter().any(|e| e.from == e.to));
    }

    #[test]
    fn style_table_has_fallback() {
        assert_eq!(node_style(None), ("ellipse", "#94a3b8"));
        assert_eq!(node_style(Some(EntityCategory::Herb)).0, "dot");
    }

    #[test]
    fn graph_serializes_nodes_and_edges() {
        let graph = build_full(&executor());
        let json = serde_json::to_value(&graph).unwrap();
        let node = &json["nodes"][0];
        for field in ["id", "label", "group", "shape", "color"] {
            assert!(node.get(field).is_some(), "missing {field}");
        }
        let edge = &json["edges"][0];
        for field in ["from", "to", "label"] {
            assert!(edge.get(field).is_some(), "missing {field}");
        }
    }
}
